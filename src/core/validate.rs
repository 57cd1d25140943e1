use super::error::InvestmentError;
use super::types::Investment;

pub const MAX_RATE: f64 = 50.0;
pub const MAX_YEARS: u32 = 50;
pub const MAX_FREQUENCY: u32 = 365;

/// Checks the preconditions the engine assumes but never enforces.
pub fn validate_investment(investment: &Investment) -> Result<(), InvestmentError> {
    if investment.name.trim().is_empty() {
        return Err(InvestmentError::invalid("name", "must not be empty"));
    }

    if !investment.principal.is_finite() || investment.principal <= 0.0 {
        return Err(InvestmentError::invalid("principal", "must be > 0"));
    }

    if !investment.rate.is_finite() || !(0.0..=MAX_RATE).contains(&investment.rate) {
        return Err(InvestmentError::invalid(
            "rate",
            format!("must be between 0 and {MAX_RATE}"),
        ));
    }

    if !(1..=MAX_YEARS).contains(&investment.time) {
        return Err(InvestmentError::invalid(
            "time",
            format!("must be between 1 and {MAX_YEARS} years"),
        ));
    }

    if let Some(frequency) = investment.frequency {
        if !(1..=MAX_FREQUENCY).contains(&frequency) {
            return Err(InvestmentError::invalid(
                "frequency",
                format!("must be between 1 and {MAX_FREQUENCY}"),
            ));
        }
    }

    if let Some(lock_in) = investment.lock_in {
        if lock_in > investment.time {
            return Err(InvestmentError::invalid("lockIn", "cannot exceed time"));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::InstrumentType;

    fn sample() -> Investment {
        Investment {
            id: "42".to_string(),
            name: "Bank FD 2024".to_string(),
            instrument: InstrumentType::Fd,
            principal: 100_000.0,
            rate: 6.5,
            time: 5,
            frequency: Some(12),
            lock_in: None,
            tax_benefit: false,
        }
    }

    fn rejected_field(investment: &Investment) -> &'static str {
        match validate_investment(investment) {
            Err(InvestmentError::InvalidInput { field, .. }) => field,
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn accepts_form_defaults() {
        assert!(validate_investment(&sample()).is_ok());
    }

    #[test]
    fn accepts_zero_rate() {
        let mut inv = sample();
        inv.rate = 0.0;
        assert!(validate_investment(&inv).is_ok());
    }

    #[test]
    fn rejects_blank_name() {
        let mut inv = sample();
        inv.name = "   ".to_string();
        assert_eq!(rejected_field(&inv), "name");
    }

    #[test]
    fn rejects_non_positive_or_non_finite_principal() {
        for principal in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            let mut inv = sample();
            inv.principal = principal;
            assert_eq!(rejected_field(&inv), "principal");
        }
    }

    #[test]
    fn rejects_out_of_range_rate() {
        for rate in [-0.5, 50.5, f64::NAN] {
            let mut inv = sample();
            inv.rate = rate;
            assert_eq!(rejected_field(&inv), "rate");
        }
    }

    #[test]
    fn rejects_zero_and_excessive_time() {
        for time in [0, MAX_YEARS + 1] {
            let mut inv = sample();
            inv.time = time;
            assert_eq!(rejected_field(&inv), "time");
        }
    }

    #[test]
    fn rejects_zero_frequency() {
        let mut inv = sample();
        inv.frequency = Some(0);
        assert_eq!(rejected_field(&inv), "frequency");
    }

    #[test]
    fn rejects_lock_in_beyond_horizon() {
        let mut inv = sample();
        inv.lock_in = Some(6);
        assert_eq!(rejected_field(&inv), "lockIn");

        inv.lock_in = Some(5);
        assert!(validate_investment(&inv).is_ok());
    }

    #[test]
    fn error_message_names_the_field() {
        let mut inv = sample();
        inv.time = 0;
        let msg = validate_investment(&inv).expect_err("time 0").to_string();
        assert!(msg.contains("time"), "{msg}");
    }
}
