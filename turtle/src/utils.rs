use tern_api::model::BlankNode;

#[derive(Default)]
pub struct BlankNodeIdGenerator {
    //TODO: avoid collisions with labels coming from the input
    counter: u64,
}

impl BlankNodeIdGenerator {
    pub fn generate(&mut self) -> BlankNode {
        self.counter += 1;
        BlankNode {
            id: format!("tern{:08}", self.counter),
        }
    }
}

/// Validates the lexical form of an `xsd:integer` plain literal.
pub fn is_valid_integer(value: &str) -> bool {
    let digits = strip_sign(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Validates the lexical form of an `xsd:decimal` plain literal:
/// an optional sign, optional integer digits, a dot, then fraction digits.
pub fn is_valid_decimal(value: &str) -> bool {
    let value = strip_sign(value);
    let mut parts = value.splitn(2, '.');
    let integer = parts.next().unwrap_or("");
    let fraction = match parts.next() {
        Some(fraction) => fraction,
        None => return false,
    };
    integer.bytes().all(|b| b.is_ascii_digit())
        && !fraction.is_empty()
        && fraction.bytes().all(|b| b.is_ascii_digit())
}

/// Validates the lexical form of an `xsd:double` plain literal: a mantissa
/// with at least one digit followed by a mandatory exponent.
pub fn is_valid_double(value: &str) -> bool {
    let value = strip_sign(value);
    let mut parts = value.splitn(2, |c| c == 'e' || c == 'E');
    let mantissa = parts.next().unwrap_or("");
    let exponent = match parts.next() {
        Some(exponent) => exponent,
        None => return false,
    };
    let mantissa_ok = {
        let mut digits = mantissa.splitn(2, '.');
        let integer = digits.next().unwrap_or("");
        let fraction = digits.next().unwrap_or("");
        (!integer.is_empty() || !fraction.is_empty())
            && integer.bytes().all(|b| b.is_ascii_digit())
            && fraction.bytes().all(|b| b.is_ascii_digit())
    };
    let exponent = strip_sign(exponent);
    mantissa_ok && !exponent.is_empty() && exponent.bytes().all(|b| b.is_ascii_digit())
}

/// Validates the lexical form of an `xsd:boolean` plain literal.
///
/// The original member-submission grammar compares case-sensitively, the
/// W3C grammars accept any casing and lowercase the emitted form.
pub fn is_valid_boolean(value: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        value == "true" || value == "false"
    } else {
        value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false")
    }
}

fn strip_sign(value: &str) -> &str {
    value
        .strip_prefix('+')
        .or_else(|| value.strip_prefix('-'))
        .unwrap_or(value)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn integer_forms() {
        assert!(is_valid_integer("0"));
        assert!(is_valid_integer("-5"));
        assert!(is_valid_integer("+42"));
        assert!(!is_valid_integer(""));
        assert!(!is_valid_integer("+"));
        assert!(!is_valid_integer("1.0"));
        assert!(!is_valid_integer("1e0"));
    }

    #[test]
    fn decimal_forms() {
        assert!(is_valid_decimal("1.5"));
        assert!(is_valid_decimal("-.5"));
        assert!(is_valid_decimal("+0.5"));
        assert!(!is_valid_decimal("1."));
        assert!(!is_valid_decimal("5"));
        assert!(!is_valid_decimal("1.5e0"));
    }

    #[test]
    fn double_forms() {
        assert!(is_valid_double("1e0"));
        assert!(is_valid_double("1.2E-3"));
        assert!(is_valid_double("-.5e+2"));
        assert!(is_valid_double("1.e3"));
        assert!(!is_valid_double("1.2"));
        assert!(!is_valid_double("e3"));
        assert!(!is_valid_double("1e"));
    }

    #[test]
    fn boolean_forms() {
        assert!(is_valid_boolean("true", true));
        assert!(!is_valid_boolean("True", true));
        assert!(is_valid_boolean("TRUE", false));
        assert!(!is_valid_boolean("yes", false));
    }

    #[test]
    fn generated_ids_are_distinct() {
        let mut generator = BlankNodeIdGenerator::default();
        let a = generator.generate();
        let b = generator.generate();
        assert_ne!(a, b);
    }
}
