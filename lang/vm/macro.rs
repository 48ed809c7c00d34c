// Pops the right operand, then the left one, and pushes `$body` unless it
// evaluates to `None`.
macro_rules! binop {
    ($stack:expr, |$l:ident, $r:ident| $body:expr) => {{
        let $r = $stack.pop_or_zero();
        let $l = $stack.pop_or_zero();
        if let Some(result) = $body {
            $stack.push(result);
        }
    }};
}

pub(crate) use binop;
