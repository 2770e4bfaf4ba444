//! Handler for the `sum` command.

use crate::analyzer::quantity::Quantity;
use crate::error::{RequestsError, Result};

/// Exact sum of the given quantities, multiplied by `factor`.
pub fn sum_quantities<S: AsRef<str>>(quantities: &[S], factor: u64) -> Result<Quantity> {
    let mut total: Option<Quantity> = None;
    for text in quantities {
        let text = text.as_ref();
        let quantity = Quantity::parse(text)
            .map_err(|e| RequestsError::InvalidInput(format!("{text}: {e}")))?;
        total = Some(match total {
            Some(current) => current.checked_add(&quantity).map_err(arithmetic)?,
            None => quantity,
        });
    }

    total
        .unwrap_or_else(Quantity::zero)
        .multiply_by_factor(factor)
        .map_err(arithmetic)
}

fn arithmetic(source: crate::analyzer::quantity::QuantityError) -> RequestsError {
    RequestsError::Arithmetic {
        context: "sum".to_string(),
        source,
    }
}

/// Handle the `sum` command.
pub fn handle_sum(quantities: &[String], factor: u64) -> Result<()> {
    let total = sum_quantities(quantities, factor)?;
    log::debug!("{} quantities x{factor} = {total}", quantities.len());
    println!("{total}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_mixed_units() {
        assert_eq!(sum_quantities(&["10m", "1"], 1).unwrap().to_string(), "1010m");
        assert_eq!(sum_quantities(&["1Gi", "512Mi"], 1).unwrap().to_string(), "1536Mi");
    }

    #[test]
    fn test_sum_with_factor() {
        assert_eq!(sum_quantities(&["100m"], 5).unwrap(), Quantity::parse("500m").unwrap());
        assert!(sum_quantities(&["100m"], 0).unwrap().is_zero());
    }

    #[test]
    fn test_sum_rejects_malformed() {
        let err = sum_quantities(&["1", "abc"], 1).unwrap_err();
        assert!(matches!(err, RequestsError::InvalidInput(ref msg) if msg.starts_with("abc: ")));
    }
}
