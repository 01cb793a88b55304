//! Brazilian national identifiers and display masks
//!
//! CPF (individuals, 11 digits) and CNPJ (companies, 14 digits) both end with
//! two modulo-11 check digits. Documents are stored as bare digits and only
//! masked for display.

/// Keep only ASCII digits
pub fn digits(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

fn to_digits(input: &str) -> Vec<u32> {
    input.chars().filter_map(|c| c.to_digit(10)).collect()
}

fn all_same(digits: &[u32]) -> bool {
    digits.windows(2).all(|w| w[0] == w[1])
}

/// Validate a CPF, masked or not
pub fn is_valid_cpf(input: &str) -> bool {
    if input.chars().any(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    let d = to_digits(input);
    if d.len() != 11 || all_same(&d) {
        return false;
    }

    [9usize, 10].iter().all(|&n| {
        let sum: u32 = d[..n]
            .iter()
            .enumerate()
            .map(|(i, digit)| digit * (n as u32 + 1 - i as u32))
            .sum();
        let check = (sum * 10) % 11 % 10;
        check == d[n]
    })
}

/// Validate a CNPJ, masked or not
pub fn is_valid_cnpj(input: &str) -> bool {
    const WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

    if input.chars().any(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    let d = to_digits(input);
    if d.len() != 14 || all_same(&d) {
        return false;
    }

    [12usize, 13].iter().all(|&n| {
        let weights = &WEIGHTS[13 - n..];
        let sum: u32 = d[..n].iter().zip(weights).map(|(a, w)| a * w).sum();
        let rest = sum % 11;
        let check = if rest < 2 { 0 } else { 11 - rest };
        check == d[n]
    })
}

fn apply_mask(digits: &str, mask: &str) -> String {
    let mut chars = digits.chars();
    let mut out = String::with_capacity(mask.len());
    for m in mask.chars() {
        if m == '#' {
            match chars.next() {
                Some(c) => out.push(c),
                None => break,
            }
        } else {
            out.push(m);
        }
    }
    out
}

/// `000.000.000-00` or `00.000.000/0000-00`, chosen by length
///
/// Anything that is neither 11 nor 14 digits long is returned unchanged.
pub fn mask_document(input: &str) -> String {
    let d = digits(input);
    match d.len() {
        11 => apply_mask(&d, "###.###.###-##"),
        14 => apply_mask(&d, "##.###.###/####-##"),
        _ => input.to_string(),
    }
}

/// `(00) 00000-0000` or `(00) 0000-0000`
pub fn mask_phone(input: &str) -> String {
    let d = digits(input);
    match d.len() {
        11 => apply_mask(&d, "(##) #####-####"),
        10 => apply_mask(&d, "(##) ####-####"),
        _ => input.to_string(),
    }
}

/// `00000-000`
pub fn mask_zip_code(input: &str) -> String {
    let d = digits(input);
    if d.len() == 8 {
        apply_mask(&d, "#####-###")
    } else {
        input.to_string()
    }
}

/// The 26 states plus the Federal District
pub const STATE_CODES: [&str; 27] = [
    "AC", "AL", "AP", "AM", "BA", "CE", "DF", "ES", "GO", "MA", "MT", "MS", "MG", "PA", "PB",
    "PR", "PE", "PI", "RJ", "RN", "RS", "RO", "RR", "SC", "SP", "SE", "TO",
];
