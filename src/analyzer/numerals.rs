//! Chinese capital-numeral parsing for the salary recognizer

use crate::domain::{MosaicError, Result};

/// Value of a single numeral character, if it belongs to the table
///
/// Both capital (壹贰叁…) and common (一二三…) forms are accepted; the
/// trailing terminator 整 maps to zero.
fn numeral_value(c: char) -> Option<u64> {
    match c {
        '零' => Some(0),
        '壹' | '一' => Some(1),
        '贰' | '二' => Some(2),
        '叁' | '三' => Some(3),
        '肆' | '四' => Some(4),
        '伍' | '五' => Some(5),
        '陆' | '六' => Some(6),
        '柒' | '七' => Some(7),
        '捌' | '八' => Some(8),
        '玖' | '九' => Some(9),
        '拾' | '十' => Some(10),
        '佰' | '百' => Some(100),
        '仟' | '千' => Some(1000),
        '万' => Some(10_000),
        '亿' => Some(100_000_000),
        '整' => Some(0),
        _ => None,
    }
}

/// Parse a Chinese capital-numeral amount string into a value
///
/// Standard accumulator: a digit waits in `pending` for its unit. A
/// sub-myriad unit (十/百/千) flushes `pending` (implicit 1 when absent,
/// as in 十万) into `section`; 万 and 亿 scale everything accumulated so
/// far. A trailing 整 is stripped before parsing.
///
/// Any character outside the numeral table fails with an error.
pub fn parse_chinese_amount(text: &str) -> Result<f64> {
    let text = text.strip_suffix('整').unwrap_or(text);

    let mut total: u64 = 0;
    let mut section: u64 = 0;
    let mut pending: u64 = 0;

    for c in text.chars() {
        let value = numeral_value(c).ok_or_else(|| {
            MosaicError::Validation(format!("invalid numeral character: {c}"))
        })?;

        match value {
            0..=9 => pending = pending * 10 + value,
            10 | 100 | 1000 => {
                let digit = if pending == 0 { 1 } else { pending };
                section += digit * value;
                pending = 0;
            }
            _ => {
                total = (total + section + pending) * value;
                section = 0;
                pending = 0;
            }
        }
    }

    Ok((total + section + pending) as f64)
}
