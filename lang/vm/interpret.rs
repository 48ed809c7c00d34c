use std::collections::HashSet;

use tracing::{debug, trace};

use lang_compiler::{BlockId, Program, Transition};
use lang_component::{vm::Inst, Chooser, Codel, Direction};

use crate::{
    config::{ExhaustedInput, PietConfig},
    io::{printable, InputRead, IoPort},
    r#macro::binop,
    stack::OperandStack,
    HaltReason, Interpreter, Status,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerState {
    pub block: BlockId,
    pub codel: Codel,
    pub dp: Direction,
    pub cc: Chooser,
}

enum Flow {
    Continue,
    NeedInput,
    Halt(HaltReason),
}

/// Graph-walking stack machine for a compiled codel grid.
pub struct PietVm<P: IoPort> {
    program: Program,
    io: P,
    config: PietConfig,
    pointer: PointerState,
    stack: OperandStack,
    status: Status,
    last_inst: Option<Inst>,
    steps: u64,
}

fn floor_div(l: i64, r: i64) -> Option<i64> {
    if r == 0 {
        return None;
    }
    let q = l.wrapping_div(r);
    if l.wrapping_rem(r) != 0 && ((l < 0) != (r < 0)) {
        Some(q - 1)
    } else {
        Some(q)
    }
}

// result takes the sign of the divisor
fn floor_mod(l: i64, r: i64) -> Option<i64> {
    if r == 0 {
        return None;
    }
    let m = l.wrapping_rem(r);
    if m != 0 && ((m < 0) != (r < 0)) {
        Some(m + r)
    } else {
        Some(m)
    }
}

impl<P: IoPort> PietVm<P> {
    /// Starts at the top-left codel facing right with the chooser on the
    /// left. A grid whose top-left codel is black cannot run at all.
    pub fn new(program: Program, io: P, config: PietConfig) -> Self {
        let origin = Codel::new(0, 0);
        let (block, status) = match program.block_at(origin) {
            Some(block) => (block, Status::Running),
            None => {
                debug!("top-left codel is black, nothing to run");
                (BlockId(0), Status::Halted(HaltReason::Blocked))
            }
        };

        Self {
            program,
            io,
            config,
            pointer: PointerState {
                block,
                codel: origin,
                dp: Direction::Right,
                cc: Chooser::Left,
            },
            stack: OperandStack::new(),
            status,
            last_inst: None,
            steps: 0,
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    pub fn stack(&self) -> &[i64] {
        self.stack.as_slice()
    }

    /// Instruction executed by the last step that moved between two colored
    /// blocks. Slides through white clear it.
    pub fn last_inst(&self) -> Option<Inst> {
        self.last_inst
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    fn interpret1(&mut self) -> Status {
        if let Status::Halted(_) = self.status {
            return self.status;
        }
        self.steps += 1;

        let current = self.program.block(self.pointer.block);
        let (src_color, size) = (current.color, current.size());

        if src_color.is_white() {
            let PointerState { codel, dp, cc, .. } = self.pointer;
            self.status = self.slide(codel, dp, cc);
            return self.status;
        }

        let Some((dp, cc, transition)) = self.locate_exit() else {
            debug!(block = %self.pointer.block, "no exit left, halting");
            self.status = Status::Halted(HaltReason::Blocked);
            return self.status;
        };

        let dst_color = self.program.block(transition.target).color;
        let Some((hue_steps, light_steps)) = src_color.steps_to(dst_color) else {
            self.status = self.slide(transition.entry, dp, cc);
            return self.status;
        };

        let inst = Inst::decode(hue_steps, light_steps);
        let mut next = PointerState {
            block: transition.target,
            codel: transition.entry,
            dp,
            cc,
        };

        self.status = match self.execute(inst, size, &mut next) {
            Flow::Continue => {
                trace!(
                    inst = ?inst,
                    block = %next.block,
                    dp = ?next.dp,
                    cc = ?next.cc,
                    depth = self.stack.len(),
                    "step"
                );
                self.pointer = next;
                self.last_inst = Some(inst);
                Status::Running
            }
            // pointer stays put so the same transition is retried
            Flow::NeedInput => Status::AwaitingInput,
            Flow::Halt(reason) => Status::Halted(reason),
        };
        self.status
    }

    /// Tries the exits of the current block, alternately toggling the
    /// chooser and rotating the direction, for at most 8 attempts.
    fn locate_exit(&self) -> Option<(Direction, Chooser, Transition)> {
        let table = self.program.exits(self.pointer.block);
        let (mut dp, mut cc) = (self.pointer.dp, self.pointer.cc);

        for attempt in 0..8 {
            if let Some(transition) = table.get(dp, cc) {
                return Some((dp, cc, transition));
            }
            if attempt % 2 == 0 {
                cc = cc.toggle();
            } else {
                dp = dp.rotate_clockwise();
            }
        }

        None
    }

    /// Walks codel by codel through white from `start` until a colored codel
    /// is reached. Running into a wall toggles the chooser and rotates the
    /// direction. Coming back to a (codel, dp, cc) state already seen means
    /// the pointer can never leave.
    fn slide(&mut self, start: Codel, mut dp: Direction, mut cc: Chooser) -> Status {
        let grid = &self.program.grid;
        let mut codel = start;
        let mut seen = HashSet::new();

        self.last_inst = None;

        loop {
            if !seen.insert((codel, dp, cc)) {
                debug!(codel = %codel, "trapped in white, halting");
                if let Some(block) = self.program.block_at(codel) {
                    self.pointer = PointerState {
                        block,
                        codel,
                        dp,
                        cc,
                    };
                }
                return Status::Halted(HaltReason::Blocked);
            }

            let ahead = grid
                .step(codel, dp)
                .and_then(|next| grid.get(next).map(|color| (next, color)));

            match ahead {
                Some((next, color)) if !color.is_black() => {
                    codel = next;
                    if color.is_white() {
                        continue;
                    }

                    if let Some(block) = self.program.block_at(next) {
                        trace!(block = %block, codel = %next, "slid into block");
                        self.pointer = PointerState {
                            block,
                            codel: next,
                            dp,
                            cc,
                        };
                    }
                    return Status::Running;
                }
                _ => {
                    cc = cc.toggle();
                    dp = dp.rotate_clockwise();
                }
            }
        }
    }

    fn exhausted(&mut self) -> Flow {
        if self.io.is_interactive() {
            return Flow::NeedInput;
        }

        match self.config.exhausted_input {
            ExhaustedInput::Skip => Flow::Continue,
            ExhaustedInput::PushZero => {
                self.stack.push(0);
                Flow::Continue
            }
            ExhaustedInput::Halt => Flow::Halt(HaltReason::InputExhausted),
        }
    }

    /// `size` is the size of the block being left; `next` is the pointer
    /// state after the move, which pointer and switch act upon.
    fn execute(&mut self, inst: Inst, size: usize, next: &mut PointerState) -> Flow {
        match inst {
            Inst::Nop => (),
            Inst::Push => self.stack.push(size as i64),
            Inst::Pop => {
                let _ = self.stack.pop();
            }
            Inst::Add => binop!(self.stack, |l, r| Some(l.wrapping_add(r))),
            Inst::Subtract => binop!(self.stack, |l, r| Some(l.wrapping_sub(r))),
            Inst::Multiply => binop!(self.stack, |l, r| Some(l.wrapping_mul(r))),
            Inst::Divide => binop!(self.stack, |l, r| floor_div(l, r)),
            Inst::Mod => binop!(self.stack, |l, r| floor_mod(l, r)),
            Inst::Not => {
                let value = self.stack.pop_or_zero();
                self.stack.push((value == 0) as i64);
            }
            Inst::Greater => binop!(self.stack, |l, r| Some((l > r) as i64)),
            Inst::Pointer => {
                let turns = self.stack.pop_or_zero();
                next.dp = next.dp.rotate(turns);
            }
            Inst::Switch => {
                let times = self.stack.pop_or_zero();
                next.cc = next.cc.toggle_times(times);
            }
            Inst::Duplicate => self.stack.duplicate(),
            Inst::Roll => {
                let count = self.stack.pop_or_zero();
                let depth = self.stack.pop_or_zero();
                self.stack.roll(depth, count);
            }
            Inst::InNumber => match self.io.read_number() {
                InputRead::Ready(n) => self.stack.push(n),
                InputRead::Malformed => (),
                InputRead::Exhausted => return self.exhausted(),
            },
            Inst::InChar => match self.io.read_char() {
                InputRead::Ready(ch) => self.stack.push(ch as i64),
                InputRead::Malformed => (),
                InputRead::Exhausted => return self.exhausted(),
            },
            Inst::OutNumber => {
                let value = self.stack.pop_or_zero();
                self.io.write_str(&value.to_string());
            }
            Inst::OutChar => {
                let value = self.stack.pop_or_zero();
                if let Some(ch) = printable(value) {
                    self.io.write_str(ch.encode_utf8(&mut [0; 4]));
                }
            }
        }

        Flow::Continue
    }
}

impl<P: IoPort> Interpreter for PietVm<P> {
    fn step(&mut self) -> Status {
        self.interpret1()
    }

    fn status(&self) -> Status {
        self.status
    }

    fn request_stop(&mut self) {
        if !matches!(self.status, Status::Halted(_)) {
            self.status = Status::Halted(HaltReason::Stopped);
        }
    }

    fn position(&self) -> Option<Codel> {
        Some(self.pointer.codel)
    }

    fn language(&self) -> &'static str {
        "piet"
    }
}

#[cfg(test)]
mod tests {
    use lang_compiler::compile;
    use lang_component::{CodelGrid, Color, Hue, Lightness};

    use super::*;
    use crate::{config::IoMode, io::IoStaging};

    const K: Color = Color::Black;
    const W: Color = Color::White;

    fn c(hue: u8, light: u8) -> Color {
        Color::new(Hue::ALL[hue as usize], Lightness::ALL[light as usize])
    }

    fn load_with(rows: Vec<Vec<Color>>, mode: IoMode, config: PietConfig) -> PietVm<IoStaging> {
        let program = compile(CodelGrid::new(rows).unwrap());
        PietVm::new(program, IoStaging::new(mode), config)
    }

    fn load(rows: Vec<Vec<Color>>) -> PietVm<IoStaging> {
        load_with(rows, IoMode::Interactive, PietConfig::default())
    }

    fn output(vm: &PietVm<IoStaging>) -> &str {
        &vm.io.contents()[crate::io::RUN_MSG.len()..]
    }

    fn give_input(vm: &mut PietVm<IoStaging>, line: &str) {
        let text = format!("{}{}", vm.io.contents(), line);
        vm.io.set_input(&text);
    }

    #[test]
    fn test_walled_codel_halts_blocked() {
        let mut vm = load(vec![vec![c(0, 0), K], vec![K, K]]);
        assert_eq!(Status::Halted(HaltReason::Blocked), vm.step());
        assert_eq!(Status::Halted(HaltReason::Blocked), vm.step());
        assert!(vm.stack().is_empty());
    }

    #[test]
    fn test_black_origin_never_runs() {
        let vm = load(vec![vec![K, c(0, 0)]]);
        assert_eq!(Status::Halted(HaltReason::Blocked), vm.status());
    }

    #[test]
    fn test_push_uses_size_of_exited_block() {
        // light red (size 2) -> red (size 1): push
        let mut vm = load(vec![vec![c(0, 0), c(0, 0), c(0, 1)]]);
        assert_eq!(Status::Running, vm.step());
        assert_eq!(Some(Inst::Push), vm.last_inst());
        assert_eq!(&[2], vm.stack());
        assert_eq!(BlockId(1), vm.pointer().block);
        assert_eq!(Codel::new(2, 0), vm.pointer().codel);
    }

    #[test]
    fn test_single_lightness_step_pushes_one() {
        let mut vm = load(vec![vec![c(0, 0), c(0, 1)]]);
        vm.step();
        assert_eq!(&[1], vm.stack());
    }

    #[test]
    fn test_hue_step_adds() {
        // push 1, push 1, then one hue step: add
        let mut vm = load(vec![vec![c(0, 0), c(0, 1), c(0, 2), c(1, 2)]]);
        vm.step();
        vm.step();
        assert_eq!(&[1, 1], vm.stack());
        vm.step();
        assert_eq!(Some(Inst::Add), vm.last_inst());
        assert_eq!(&[2], vm.stack());
        assert_eq!(3, vm.steps());
    }

    #[test]
    fn test_out_number_on_empty_stack_writes_zero() {
        // five hue steps and one lightness step: out(number)
        let mut vm = load(vec![vec![c(0, 0), c(5, 1)]]);
        vm.step();
        assert_eq!(Some(Inst::OutNumber), vm.last_inst());
        assert_eq!("0", output(&vm));
    }

    #[test]
    fn test_divide_by_zero_drops_both_operands() {
        let mut vm = load(vec![vec![c(0, 0), c(2, 0)]]);
        vm.stack = OperandStack::from(vec![9, 7, 0]);
        vm.step();
        assert_eq!(Some(Inst::Divide), vm.last_inst());
        assert_eq!(&[9], vm.stack());
    }

    #[test]
    fn test_arithmetic_operand_order() {
        let mut vm = load(vec![vec![c(0, 0), c(1, 1)]]);
        vm.stack = OperandStack::from(vec![10, 3]);
        vm.step();
        assert_eq!(Some(Inst::Subtract), vm.last_inst());
        assert_eq!(&[7], vm.stack());

        let mut vm = vm_div(-7, 2);
        vm.step();
        assert_eq!(&[-4], vm.stack());

        // mod takes the sign of the divisor
        let mut vm = vm_mod(-7, 3);
        vm.step();
        assert_eq!(&[2], vm.stack());
        let mut vm = vm_mod(7, -3);
        vm.step();
        assert_eq!(&[-2], vm.stack());
    }

    fn vm_div(l: i64, r: i64) -> PietVm<IoStaging> {
        let mut vm = load(vec![vec![c(0, 0), c(2, 0)]]);
        vm.stack = OperandStack::from(vec![l, r]);
        vm
    }

    fn vm_mod(l: i64, r: i64) -> PietVm<IoStaging> {
        let mut vm = load(vec![vec![c(0, 0), c(2, 1)]]);
        vm.stack = OperandStack::from(vec![l, r]);
        vm
    }

    /// Steps once from light red into `c(hue, light)` with `stack` loaded.
    fn step_into(hue: u8, light: u8, stack: &[i64]) -> PietVm<IoStaging> {
        let mut vm = load(vec![vec![c(0, 0), c(hue, light)]]);
        vm.stack = OperandStack::from(stack.to_vec());
        assert_eq!(Status::Running, vm.step());
        vm
    }

    #[test]
    fn test_nop_leaves_everything_alone() {
        // adjacent blocks never share a color, so nop is only reachable here
        let mut vm = load(vec![vec![c(0, 0), c(0, 1)]]);
        vm.stack = OperandStack::from(vec![4]);
        let mut next = vm.pointer();

        assert!(matches!(vm.execute(Inst::Nop, 3, &mut next), Flow::Continue));
        assert_eq!(&[4], vm.stack());
        assert_eq!(vm.pointer(), next);
    }

    #[test]
    fn test_pop() {
        let vm = step_into(0, 2, &[1, 2]);
        assert_eq!(Some(Inst::Pop), vm.last_inst());
        assert_eq!(&[1], vm.stack());

        let vm = step_into(0, 2, &[]);
        assert!(vm.stack().is_empty());
    }

    #[test]
    fn test_multiply() {
        let vm = step_into(1, 2, &[3, 4]);
        assert_eq!(Some(Inst::Multiply), vm.last_inst());
        assert_eq!(&[12], vm.stack());
    }

    #[test]
    fn test_not() {
        let vm = step_into(2, 2, &[0]);
        assert_eq!(Some(Inst::Not), vm.last_inst());
        assert_eq!(&[1], vm.stack());

        let vm = step_into(2, 2, &[5]);
        assert_eq!(&[0], vm.stack());
    }

    #[test]
    fn test_greater_compares_second_to_top() {
        let vm = step_into(3, 0, &[5, 3]);
        assert_eq!(Some(Inst::Greater), vm.last_inst());
        assert_eq!(&[1], vm.stack());

        let vm = step_into(3, 0, &[3, 5]);
        assert_eq!(&[0], vm.stack());
    }

    #[test]
    fn test_switch_with_negative_count() {
        let vm = step_into(3, 2, &[-3]);
        assert_eq!(Some(Inst::Switch), vm.last_inst());
        assert_eq!(Chooser::Right, vm.pointer().cc);
        assert_eq!(Direction::Right, vm.pointer().dp);

        let vm = step_into(3, 2, &[-2]);
        assert_eq!(Chooser::Left, vm.pointer().cc);
    }

    #[test]
    fn test_duplicate() {
        let vm = step_into(4, 0, &[7]);
        assert_eq!(Some(Inst::Duplicate), vm.last_inst());
        assert_eq!(&[7, 7], vm.stack());

        let vm = step_into(4, 0, &[]);
        assert!(vm.stack().is_empty());
    }

    #[test]
    fn test_pointer_with_negative_count() {
        let vm = step_into(3, 1, &[-1]);
        assert_eq!(Some(Inst::Pointer), vm.last_inst());
        assert_eq!(Direction::Up, vm.pointer().dp);
    }

    #[test]
    fn test_roll_deeper_than_stack_is_noop() {
        let mut vm = load(vec![vec![c(0, 0), c(4, 1)]]);
        vm.stack = OperandStack::from(vec![5, 6, 7, 9, 1]);
        vm.step();
        assert_eq!(Some(Inst::Roll), vm.last_inst());
        assert_eq!(&[5, 6, 7], vm.stack());
    }

    #[test]
    fn test_pointer_rotates_after_move() {
        // pointer with 1 on the stack turns the direction to Down
        let mut vm = load(vec![vec![c(0, 0), c(3, 1)]]);
        vm.stack = OperandStack::from(vec![1]);
        vm.step();
        assert_eq!(Some(Inst::Pointer), vm.last_inst());
        assert_eq!(Direction::Down, vm.pointer().dp);
        assert_eq!(Chooser::Left, vm.pointer().cc);
    }

    #[test]
    fn test_exit_search_toggles_then_rotates() {
        // right is blocked from the start, the pointer has to turn down
        let mut vm = load(vec![vec![c(0, 0), K], vec![c(0, 1), K]]);
        vm.step();
        assert_eq!(Some(Inst::Push), vm.last_inst());
        assert_eq!(Direction::Down, vm.pointer().dp);
        assert_eq!(Chooser::Right, vm.pointer().cc);
    }

    #[test]
    fn test_slide_through_white_executes_nothing() {
        let mut vm = load(vec![vec![c(0, 0), W, W, c(0, 1)]]);
        assert_eq!(Status::Running, vm.step());
        assert_eq!(None, vm.last_inst());
        assert!(vm.stack().is_empty());
        assert_eq!(Codel::new(3, 0), vm.pointer().codel);
        assert_eq!(BlockId(2), vm.pointer().block);
    }

    #[test]
    fn test_slide_turns_at_walls() {
        // white corridor turning down at the border
        let mut vm = load(vec![vec![c(0, 0), W], vec![K, c(1, 0)]]);
        assert_eq!(Status::Running, vm.step());
        assert_eq!(Codel::new(1, 1), vm.pointer().codel);
        assert_eq!(Direction::Down, vm.pointer().dp);
        assert_eq!(Chooser::Right, vm.pointer().cc);
    }

    #[test]
    fn test_white_origin_slides_first() {
        let mut vm = load(vec![vec![W, c(2, 2)]]);
        assert_eq!(Status::Running, vm.step());
        assert_eq!(BlockId(1), vm.pointer().block);
    }

    #[test]
    fn test_trapped_in_white_halts() {
        let mut vm = load(vec![vec![W, W], vec![W, K]]);
        assert_eq!(Status::Halted(HaltReason::Blocked), vm.step());
        assert_eq!(Status::Halted(HaltReason::Blocked), vm.status());
    }

    #[test]
    fn test_read_char_waits_for_input() {
        // in(char) is five hue steps, no lightness step
        let mut vm = load(vec![vec![c(0, 0), c(5, 0)]]);
        let before = vm.pointer();

        assert_eq!(Status::AwaitingInput, vm.step());
        assert_eq!(before, vm.pointer());
        assert_eq!(Status::AwaitingInput, vm.step());

        give_input(&mut vm, "A\n");
        assert_eq!(Status::Running, vm.step());
        assert_eq!(Some(Inst::InChar), vm.last_inst());
        assert_eq!(&[65], vm.stack());
        assert_eq!(BlockId(1), vm.pointer().block);
    }

    #[test]
    fn test_read_number() {
        let mut vm = load(vec![vec![c(0, 0), c(4, 2)]]);
        give_input(&mut vm, " -12\n");
        assert_eq!(Status::Running, vm.step());
        assert_eq!(Some(Inst::InNumber), vm.last_inst());
        assert_eq!(&[-12], vm.stack());
    }

    #[test]
    fn test_staged_exhausted_input_policies() {
        let rows = || vec![vec![c(0, 0), c(5, 0)]];

        let mut vm = load_with(rows(), IoMode::Staged, PietConfig::default());
        assert_eq!(Status::Running, vm.step());
        assert!(vm.stack().is_empty());

        let config = PietConfig {
            exhausted_input: ExhaustedInput::PushZero,
        };
        let mut vm = load_with(rows(), IoMode::Staged, config);
        assert_eq!(Status::Running, vm.step());
        assert_eq!(&[0], vm.stack());

        let config = PietConfig {
            exhausted_input: ExhaustedInput::Halt,
        };
        let mut vm = load_with(rows(), IoMode::Staged, config);
        assert_eq!(Status::Halted(HaltReason::InputExhausted), vm.step());
    }

    #[test]
    fn test_out_char_filters_unprintable() {
        // out(char) is five hue steps and two lightness steps
        let mut vm = load(vec![vec![c(0, 0), c(5, 2), c(4, 1), c(3, 0)]]);
        vm.stack = OperandStack::from(vec![72, 1, 7]);
        vm.step();
        assert_eq!("", output(&vm));
        vm.step();
        assert_eq!("", output(&vm));
        vm.step();
        assert_eq!(Some(Inst::OutChar), vm.last_inst());
        assert_eq!("H", output(&vm));
    }

    #[test]
    fn test_request_stop() {
        let mut vm = load(vec![vec![c(0, 0), c(0, 1)]]);
        vm.request_stop();
        assert_eq!(Status::Halted(HaltReason::Stopped), vm.step());
        assert!(!vm.is_running());
        assert!(vm.stack().is_empty());
    }
}
