//! Program loading.
//!
//! A program is plain text with one word per line: an optionally signed
//! decimal integer. Words fill the memory from address zero up. Loading
//! stops at the end of the source or at the `-99999` sentinel line,
//! whichever comes first, and the rest of the memory stays zeroed.

use miette::{Diagnostic, SourceSpan};
use nom::bytes::complete::take_while1;
use nom::character::complete::one_of;
use nom::combinator::{all_consuming, map_res, opt, recognize};
use nom::sequence::preceded;
use nom::{Finish, IResult, Offset};
use thiserror::Error;
use tracing::debug;

use crate::constants::{self as C, Address, Word};
use crate::runtime::Memory;

/// Failure to turn a program source into a memory image.
///
/// Loading is all-or-nothing: any failure aborts the load and no memory
/// image is produced.
#[derive(Debug, Error, Diagnostic)]
pub enum LoadError {
    /// A line that is not a word literal
    #[error("line {line} is not a word literal")]
    InvalidLiteral {
        line: usize,
        #[label("expected an optionally signed decimal integer")]
        span: SourceSpan,
    },

    /// A well-formed literal that does not fit in a word
    #[error("word out of bounds on line {line}: {word}")]
    OutOfBounds {
        line: usize,
        word: Word,
        #[label("words go from -9999 to 9999")]
        span: SourceSpan,
    },

    /// More program words than the machine has memory
    #[error("program does not fit in memory")]
    TooLong {
        line: usize,
        #[label("no memory left for this word")]
        span: SourceSpan,
    },
}

fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

/// Parse a word literal: an optionally signed decimal integer
fn parse_word(input: &str) -> IResult<&str, Word> {
    map_res(
        recognize(preceded(opt(one_of("+-")), take_while1(is_digit))),
        str::parse,
    )(input)
}

/// Span of one source line within the whole source, for error labels
fn line_span(source: &str, line: &str) -> SourceSpan {
    (source.offset(line), line.len()).into()
}

/// Parse and validate a program source into a fresh memory image.
///
/// # Errors
///
/// Fails on the first line that is not a word literal, on any word outside
/// bounds, and on programs longer than the memory. A partially loaded
/// memory is never returned.
pub fn load_program(source: &str) -> Result<Memory, LoadError> {
    let mut memory = Memory::default();
    let mut address: Address = 0;

    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;

        let (_, word) = all_consuming(parse_word)(raw.trim())
            .finish()
            .map_err(|_| LoadError::InvalidLiteral {
                line,
                span: line_span(source, raw),
            })?;

        if word == C::SENTINEL {
            debug!(address, "Sentinel reached, stopping the load");
            break;
        }

        if !C::valid_word(word) {
            return Err(LoadError::OutOfBounds {
                line,
                word,
                span: line_span(source, raw),
            });
        }

        let cell = memory.get_mut(address).map_err(|_| LoadError::TooLong {
            line,
            span: line_span(source, raw),
        })?;
        *cell = word;
        address += 1;
    }

    debug!(words = address, "Program loaded");
    Ok(memory)
}
