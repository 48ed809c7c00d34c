#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Inst {
    // colour changed only in ways that mean nothing
    Nop,
    // stack operations
    Push,
    Pop,
    Duplicate,
    Roll,
    // arithmetics
    Add,
    Subtract,
    Multiply,
    Divide,
    Mod,
    // logical
    Not,
    Greater,
    // pointer control
    Pointer,
    Switch,
    // input/output
    InNumber,
    InChar,
    OutNumber,
    OutChar,
}

// indexed by [hue steps][lightness steps]
const INST_TABLE: [[Inst; 3]; 6] = [
    [Inst::Nop, Inst::Push, Inst::Pop],
    [Inst::Add, Inst::Subtract, Inst::Multiply],
    [Inst::Divide, Inst::Mod, Inst::Not],
    [Inst::Greater, Inst::Pointer, Inst::Switch],
    [Inst::Duplicate, Inst::Roll, Inst::InNumber],
    [Inst::InChar, Inst::OutNumber, Inst::OutChar],
];

impl Inst {
    /// Decodes a colour change. Steps outside the hue/lightness cycles wrap.
    pub fn decode(hue_steps: u8, light_steps: u8) -> Inst {
        INST_TABLE[hue_steps as usize % 6][light_steps as usize % 3]
    }
}
