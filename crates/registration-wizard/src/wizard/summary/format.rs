//! Display masks shared by the on-screen summary and the exported document.
//!
//! Every formatter returns its input unchanged when the digits do not fit the mask.

use crate::wizard::domain::Salary;
use crate::wizard::salary::parse_amount;
use crate::wizard::validators::digits_only;

/// `DD/MM/YYYY`. Eight loose digits are read day-first; ISO `YYYY-MM-DD` is converted.
pub fn format_birth_date(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let digits = digits_only(raw);
    if digits.len() == 8 {
        let day: u32 = digits[0..2].parse().unwrap_or(0);
        let month: u32 = digits[2..4].parse().unwrap_or(0);
        if (1..=31).contains(&day) && (1..=12).contains(&month) {
            return format!("{}/{}/{}", &digits[0..2], &digits[2..4], &digits[4..8]);
        }
    }

    if raw.contains('/') {
        return raw.to_string();
    }

    if raw.contains('-') {
        let mut parts = raw.splitn(3, '-');
        if let (Some(year), Some(month), Some(day)) = (parts.next(), parts.next(), parts.next()) {
            return format!("{day:0>2}/{month:0>2}/{year}");
        }
    }

    raw.to_string()
}

/// `000.000.000-00`.
pub fn format_national_id(raw: &str) -> String {
    let digits = digits_only(raw);
    if digits.len() != 11 {
        return raw.to_string();
    }
    format!(
        "{}.{}.{}-{}",
        &digits[0..3],
        &digits[3..6],
        &digits[6..9],
        &digits[9..11]
    )
}

/// `(00) 00000-0000` for mobiles, `(00) 0000-0000` for landlines.
pub fn format_phone(raw: &str) -> String {
    let digits = digits_only(raw);
    match digits.len() {
        11 => format!("({}) {}-{}", &digits[0..2], &digits[2..7], &digits[7..11]),
        10 => format!("({}) {}-{}", &digits[0..2], &digits[2..6], &digits[6..10]),
        _ => raw.to_string(),
    }
}

/// `00000-000`.
pub fn format_postal_code(raw: &str) -> String {
    let digits = digits_only(raw);
    if digits.len() != 8 {
        return raw.to_string();
    }
    format!("{}-{}", &digits[0..5], &digits[5..8])
}

/// Brazilian currency, e.g. `R$ 1.234,56`. Empty, zero and unparsable salaries
/// render as `R$ 0,00`.
pub fn format_salary_brl(salary: &Salary) -> String {
    let amount = match salary {
        Salary::Number(value) => *value,
        Salary::RawText(text) => parse_amount(text).unwrap_or(0.0),
    };
    format_brl(amount)
}

fn format_brl(amount: f64) -> String {
    if !amount.is_finite() || amount == 0.0 {
        return "R$ 0,00".to_string();
    }

    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (position, digit) in whole.chars().enumerate() {
        if position > 0 && (whole.len() - position) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}R$ {grouped},{:02}", cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn birth_date_accepts_loose_and_iso_inputs() {
        assert_eq!(format_birth_date("15081990"), "15/08/1990");
        assert_eq!(format_birth_date("15/08/1990"), "15/08/1990");
        assert_eq!(format_birth_date("1990-08-15"), "15/08/1990");
        assert_eq!(format_birth_date("1990-8-5"), "05/08/1990");
        assert_eq!(format_birth_date(""), "");
    }

    #[test]
    fn birth_date_with_day_zero_is_left_unmasked() {
        assert_eq!(format_birth_date("00081990"), "00081990");
        assert_eq!(format_birth_date("01081990"), "01/08/1990");
    }

    #[test]
    fn masks_keep_the_original_digits() {
        let national_id = format_national_id("12345678909");
        assert_eq!(national_id, "123.456.789-09");
        assert_eq!(digits_only(&national_id), "12345678909");

        let mobile = format_phone("11987654321");
        assert_eq!(mobile, "(11) 98765-4321");
        assert_eq!(digits_only(&mobile), "11987654321");

        let landline = format_phone("1133334444");
        assert_eq!(landline, "(11) 3333-4444");
        assert_eq!(digits_only(&landline), "1133334444");

        let postal_code = format_postal_code("01310100");
        assert_eq!(postal_code, "01310-100");
        assert_eq!(digits_only(&postal_code), "01310100");
    }

    #[test]
    fn malformed_values_pass_through() {
        assert_eq!(format_national_id("123"), "123");
        assert_eq!(format_phone("99"), "99");
        assert_eq!(format_postal_code("0131"), "0131");
    }

    #[test]
    fn salary_uses_brazilian_grouping() {
        assert_eq!(format_salary_brl(&Salary::Number(1234.56)), "R$ 1.234,56");
        assert_eq!(format_salary_brl(&Salary::Number(1_500_000.0)), "R$ 1.500.000,00");
        assert_eq!(format_salary_brl(&Salary::Number(950.5)), "R$ 950,50");
        assert_eq!(
            format_salary_brl(&Salary::RawText("R$ 5.000,00".to_string())),
            "R$ 5.000,00"
        );
    }

    #[test]
    fn empty_or_unparsable_salary_renders_zero() {
        assert_eq!(format_salary_brl(&Salary::Number(0.0)), "R$ 0,00");
        assert_eq!(format_salary_brl(&Salary::default()), "R$ 0,00");
        assert_eq!(format_salary_brl(&Salary::RawText("abc".to_string())), "R$ 0,00");
    }
}
