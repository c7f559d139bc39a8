//! Checksum algorithms used by the identifier recognizers
//!
//! Both checks run on candidate substrings only; they never see the full
//! input text.

/// Weights for the 18-digit national ID checksum (GB 11643)
const ID_WEIGHTS: [u32; 17] = [7, 9, 10, 5, 8, 4, 2, 1, 6, 3, 7, 9, 10, 5, 8, 4, 2];

/// Check characters indexed by the weighted sum mod 11
const ID_CHECK_CHARS: [char; 11] = ['1', '0', 'X', '9', '8', '7', '6', '5', '4', '3', '2'];

/// Advisory issuer-bank BIN prefixes
///
/// Longest prefix wins. Identification is informational only and never
/// gates card validity.
const BANK_BIN_PREFIXES: [(&str, &str); 10] = [
    ("621790", "中国银行"),
    ("621700", "中国建设银行"),
    ("621661", "中国银行"),
    ("622202", "中国工商银行"),
    ("622848", "中国农业银行"),
    ("622588", "招商银行"),
    ("622155", "浦发银行"),
    ("621226", "中国工商银行"),
    ("620058", "中国银联"),
    ("62", "银联卡"),
];

/// Luhn checksum over a digit string
///
/// Reverses the digits, doubles every digit at an odd index (0-based from
/// the right), subtracts 9 from doubled digits above 9, and accepts iff the
/// sum is divisible by 10. Non-digit input fails the check.
pub fn luhn_check(digits: &str) -> bool {
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }

    let sum: u32 = digits
        .chars()
        .rev()
        .enumerate()
        .map(|(idx, c)| {
            let d = c.to_digit(10).unwrap_or(0);
            if idx % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();

    sum % 10 == 0
}

/// Verify the check digit of an 18-character national ID
///
/// The first 17 characters must be digits; the final character may be a
/// digit or `x`/`X`.
pub fn id_check_digit(id: &str) -> bool {
    let chars: Vec<char> = id.chars().collect();
    if chars.len() != 18 {
        return false;
    }

    let mut sum = 0u32;
    for (i, c) in chars[..17].iter().enumerate() {
        match c.to_digit(10) {
            Some(d) => sum += d * ID_WEIGHTS[i],
            None => return false,
        }
    }

    let expected = ID_CHECK_CHARS[(sum % 11) as usize];
    let actual = chars[17].to_ascii_uppercase();
    actual == expected
}

/// Look up the issuing bank for a card number by BIN prefix
pub fn issuing_bank(card_digits: &str) -> Option<&'static str> {
    BANK_BIN_PREFIXES
        .iter()
        .filter(|(prefix, _)| card_digits.starts_with(prefix))
        .max_by_key(|(prefix, _)| prefix.len())
        .map(|(_, bank)| *bank)
}
