//! CLI Exit Code Registry
//!
//! Single source of truth for `tcolor` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                        |
//! |------|------------------------------------------------|
//! | 0    | Success                                        |
//! | 1    | General error (nothing to undo, ...)           |
//! | 2    | Usage error (bad arguments, out-of-range cell) |
//! | 3    | I/O error reading or writing files             |
//! | 4    | Parse error (bad color, rule or JSON)          |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - the command ran but could not do what was asked.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, coordinates outside the table.
pub const EXIT_USAGE: u8 = 2;

/// Reading or writing a file failed.
pub const EXIT_IO: u8 = 3;

/// Input could not be parsed.
pub const EXIT_PARSE: u8 = 4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let codes = [EXIT_SUCCESS, EXIT_ERROR, EXIT_USAGE, EXIT_IO, EXIT_PARSE];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
