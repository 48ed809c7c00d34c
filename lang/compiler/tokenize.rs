use nom::{
    bytes::complete::take_while_m_n,
    character::complete::{char, space0, space1},
    combinator::{all_consuming, map_res},
    multi::separated_list1,
    sequence::{delimited, preceded, tuple},
    Err, IResult,
};

use lang_component::Color;

use crate::CompileError;

/// What to do with a cell whose RGB value is not one of the 20 legal colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownColors {
    #[default]
    Reject,
    AsWhite,
    AsBlack,
}

type Rgb = (u8, u8, u8);

fn tokenize_hex_byte(s: &str) -> IResult<&str, u8> {
    map_res(take_while_m_n(2, 2, |c: char| c.is_ascii_hexdigit()), |hex| {
        u8::from_str_radix(hex, 16)
    })(s)
}

fn tokenize_rgb(s: &str) -> IResult<&str, Rgb> {
    preceded(
        char('#'),
        tuple((tokenize_hex_byte, tokenize_hex_byte, tokenize_hex_byte)),
    )(s)
}

fn tokenize_row(s: &str) -> IResult<&str, Vec<Rgb>> {
    delimited(space0, separated_list1(space1, tokenize_rgb), space0)(s)
}

fn is_skipped(line: &str) -> bool {
    let line = line.trim();
    line.is_empty() || line.starts_with(';')
}

/// Reads a textual codel grid: one row per line, `#RRGGBB` cells separated
/// by blanks. Blank lines and `;` comments are skipped. Row lengths are not
/// checked here.
pub fn tokenize(source: &str, unknown: UnknownColors) -> Result<Vec<Vec<Color>>, CompileError> {
    let mut rows = Vec::new();

    for (idx, line) in source.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.trim_end_matches('\r');
        if is_skipped(line) {
            continue;
        }

        let cells = match all_consuming(tokenize_row)(line) {
            Ok((_, cells)) => cells,
            Err(Err::Error(err)) | Err(Err::Failure(err)) => {
                let column = line.len() - err.input.len() + 1;
                return Err(CompileError::Syntax {
                    line: line_no,
                    message: format!("expected `#RRGGBB` cell at column {}", column),
                });
            }
            Err(Err::Incomplete(_)) => unreachable!("complete parsers never ask for more input"),
        };

        let mut row = Vec::with_capacity(cells.len());
        for (col, (r, g, b)) in cells.into_iter().enumerate() {
            let color = match (Color::from_rgb(r, g, b), unknown) {
                (Some(color), _) => color,
                (None, UnknownColors::AsWhite) => Color::White,
                (None, UnknownColors::AsBlack) => Color::Black,
                (None, UnknownColors::Reject) => {
                    return Err(CompileError::UnknownColor {
                        line: line_no,
                        column: col + 1,
                        hex: format!("#{:02X}{:02X}{:02X}", r, g, b),
                    })
                }
            };
            row.push(color);
        }
        rows.push(row);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use lang_component::{Hue, Lightness};

    use super::*;

    fn test_tokenize_fn<T: PartialEq + std::fmt::Debug>(
        func: &dyn Fn(&str) -> IResult<&str, T>,
        expected: T,
        input: &str,
    ) {
        if let Ok(("", result)) = func(input) {
            assert_eq!(expected, result);
        } else {
            println!("result = {:?}", func(input));
            assert!(false);
        }
    }

    #[test]
    fn test_tokenize_rgb() {
        test_tokenize_fn(&tokenize_rgb, (0xFF, 0xC0, 0xC0), "#FFC0C0");
        test_tokenize_fn(&tokenize_rgb, (0x00, 0xc0, 0xc0), "#00c0c0");
        assert!(tokenize_rgb("FFC0C0").is_err());
        assert!(tokenize_rgb("#FFC0").is_err());
    }

    #[test]
    fn test_tokenize_row() {
        test_tokenize_fn(
            &tokenize_row,
            vec![(0xFF, 0xFF, 0xFF), (0, 0, 0)],
            "  #FFFFFF\t#000000 ",
        );
    }

    #[test]
    fn test_tokenize_grid_skips_comments_and_blanks() {
        let source = "; hello\n#FF0000 #FFFFFF\n\n#000000 #C0C0FF\r\n";
        let rows = tokenize(source, UnknownColors::Reject).unwrap();

        assert_eq!(
            vec![
                vec![Color::new(Hue::Red, Lightness::Normal), Color::White],
                vec![Color::Black, Color::new(Hue::Blue, Lightness::Light)],
            ],
            rows
        );
    }

    #[test]
    fn test_tokenize_reports_syntax_position() {
        let err = tokenize("#FFFFFF #FFFFFFX", UnknownColors::Reject).unwrap_err();
        assert!(matches!(err, CompileError::Syntax { line: 1, .. }));
    }

    #[test]
    fn test_unknown_colors_policy() {
        let source = "#FFFFFF #123456";
        assert_eq!(
            Err(CompileError::UnknownColor {
                line: 1,
                column: 2,
                hex: "#123456".to_string()
            }),
            tokenize(source, UnknownColors::Reject)
        );
        assert_eq!(
            vec![vec![Color::White, Color::Black]],
            tokenize(source, UnknownColors::AsBlack).unwrap()
        );
        assert_eq!(
            vec![vec![Color::White, Color::White]],
            tokenize(source, UnknownColors::AsWhite).unwrap()
        );
    }
}
