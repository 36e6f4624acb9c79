use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy::MidpointAwayFromZero;
use thiserror::Error;

use crate::app::config::{Field, Inputs, CURRENCY};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParameterError {
    #[error("Campo {field}: \"{input}\" não é um número")]
    NotANumber { field: Field, input: String },
    #[error("Campo {field}: \"{input}\" não é um número inteiro")]
    NotAnInteger { field: Field, input: String },
    #[error("Campo {field}: \"{input}\" está fora do intervalo representável")]
    NumberOutOfRange { field: Field, input: String },
    #[error("Duração de {requested} meses não pode ser representada")]
    MonthCountOutOfRange { requested: i64 },
    #[error("Valores fora do intervalo representável no mês {month}")]
    OutOfRange { month: u32 },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Params {
    pub initial_value: Decimal,
    pub monthly_contribution: Decimal,
    pub monthly_rate_percent: Decimal,
    pub num_months: i64,
}

impl Params {
    pub fn parse(inputs: &Inputs) -> Result<Self, ParameterError> {
        Ok(Self {
            initial_value: parse_decimal(inputs, Field::InitialValue)?,
            monthly_contribution: parse_decimal(inputs, Field::MonthlyContribution)?,
            monthly_rate_percent: parse_decimal(inputs, Field::MonthlyRate)?,
            num_months: parse_months(inputs)?,
        })
    }
}

fn parse_decimal(inputs: &Inputs, field: Field) -> Result<Decimal, ParameterError> {
    let raw = inputs.get(field);
    let text = raw.trim();
    Decimal::from_str(text)
        .or_else(|e| {
            if text.contains(['e', 'E']) {
                Decimal::from_scientific(text)
            } else {
                Err(e)
            }
        })
        .map_err(|_| {
            // Finite floats that Decimal cannot hold are a range problem, not a typo.
            let input = raw.to_owned();
            match text.parse::<f64>() {
                Ok(v) if v.is_finite() => ParameterError::NumberOutOfRange { field, input },
                _ => ParameterError::NotANumber { field, input },
            }
        })
}

fn parse_months(inputs: &Inputs) -> Result<i64, ParameterError> {
    let raw = inputs.get(Field::NumMonths);
    raw.trim()
        .parse()
        .map_err(|_| ParameterError::NotAnInteger {
            field: Field::NumMonths,
            input: raw.to_owned(),
        })
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub month: u32,
    pub contribution: Decimal,
    pub interest: Decimal,
    pub balance: Decimal,
}

/// Month-ordered accrual records. Built only by [`generate`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Schedule {
    entries: Vec<ScheduleEntry>,
}

impl Schedule {
    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn balances(&self) -> Vec<Decimal> {
        self.entries.iter().map(|e| e.balance).collect()
    }

    pub fn final_balance(&self) -> Option<Decimal> {
        self.entries.last().map(|e| e.balance)
    }

    pub fn total_contributed(&self) -> Decimal {
        self.entries
            .iter()
            .fold(Decimal::ZERO, |acc, e| acc.saturating_add(e.contribution))
    }

    pub fn total_interest(&self) -> Decimal {
        self.entries
            .iter()
            .fold(Decimal::ZERO, |acc, e| acc.saturating_add(e.interest))
    }
}

pub fn generate_from_inputs(inputs: &Inputs) -> Result<Schedule, ParameterError> {
    generate(&Params::parse(inputs)?)
}

pub fn generate(params: &Params) -> Result<Schedule, ParameterError> {
    // Zero or negative durations produce an empty schedule.
    let months = u32::try_from(params.num_months.max(0)).map_err(|_| {
        ParameterError::MonthCountOutOfRange {
            requested: params.num_months,
        }
    })?;

    let mut entries = Vec::new();
    entries
        .try_reserve_exact(months as usize)
        .map_err(|_| ParameterError::MonthCountOutOfRange {
            requested: params.num_months,
        })?;

    let rate = params.monthly_rate_percent / Decimal::ONE_HUNDRED;
    let mut balance = params.initial_value;

    for month in 1..=months {
        let out_of_range = || ParameterError::OutOfRange { month };

        balance = balance
            .checked_add(params.monthly_contribution)
            .ok_or_else(out_of_range)?;
        let interest = balance.checked_mul(rate).ok_or_else(out_of_range)?;
        balance = balance.checked_add(interest).ok_or_else(out_of_range)?;

        entries.push(ScheduleEntry {
            month,
            contribution: params.monthly_contribution,
            interest,
            balance,
        });
    }

    Ok(Schedule { entries })
}

/// Fixed-point, two decimals, no thousands separator.
pub fn format_plain(value: Decimal) -> String {
    format!("{:.2}", value.round_dp_with_strategy(2, MidpointAwayFromZero))
}

pub fn format_money(value: Decimal) -> String {
    format!("{CURRENCY} {}", format_plain(value))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn params(initial: &str, contribution: &str, rate: &str, months: i64) -> Params {
        Params {
            initial_value: dec(initial),
            monthly_contribution: dec(contribution),
            monthly_rate_percent: dec(rate),
            num_months: months,
        }
    }

    #[test]
    fn single_month_accrues_on_post_contribution_balance() {
        let schedule = generate(&params("1000", "100", "1", 1)).unwrap();

        assert_eq!(
            schedule.entries(),
            &[ScheduleEntry {
                month: 1,
                contribution: dec("100"),
                interest: dec("11"),
                balance: dec("1111"),
            }]
        );
        assert_eq!(format_plain(schedule.entries()[0].interest), "11.00");
        assert_eq!(format_money(schedule.entries()[0].balance), "R$ 1111.00");
    }

    #[test]
    fn zero_inputs_stay_zero() {
        let schedule = generate(&params("0", "0", "5", 3)).unwrap();

        assert_eq!(schedule.len(), 3);
        for entry in schedule.entries() {
            assert_eq!(format_plain(entry.contribution), "0.00");
            assert_eq!(format_plain(entry.interest), "0.00");
            assert_eq!(format_plain(entry.balance), "0.00");
        }
    }

    #[test]
    fn second_month_builds_on_first() {
        let schedule = generate(&params("1000", "100", "1", 2)).unwrap();
        let second = schedule.entries()[1];

        // (1111 + 100) * 0.01
        assert_eq!(second.interest, dec("12.11"));
        assert_eq!(second.balance, dec("1223.11"));
        assert_eq!(schedule.final_balance(), Some(dec("1223.11")));
        assert_eq!(schedule.total_contributed(), dec("200"));
        assert_eq!(schedule.total_interest(), dec("23.11"));
    }

    #[test]
    fn non_positive_months_yield_empty_schedule() {
        assert!(generate(&params("1000", "100", "1", 0)).unwrap().is_empty());
        assert!(generate(&params("1000", "100", "1", -4)).unwrap().is_empty());
    }

    #[test]
    fn negative_rate_is_applied_as_is() {
        let schedule = generate(&params("1000", "0", "-10", 1)).unwrap();
        assert_eq!(schedule.entries()[0].interest, dec("-100"));
        assert_eq!(schedule.entries()[0].balance, dec("900"));
    }

    #[test]
    fn long_durations_are_generated_in_full() {
        let schedule = generate(&params("1000", "100", "0.1", 6001)).unwrap();

        assert_eq!(schedule.len(), 6001);
        assert_eq!(schedule.entries().last().map(|e| e.month), Some(6001));
    }

    #[test]
    fn month_counts_beyond_u32_are_rejected() {
        let requested = i64::from(u32::MAX) + 1;
        assert_eq!(
            generate(&params("1", "1", "1", requested)),
            Err(ParameterError::MonthCountOutOfRange { requested })
        );
    }

    #[test]
    fn overflow_is_reported_not_panicked() {
        let result = generate(&params("100000000000000000000", "0", "1000", 100));
        assert!(matches!(result, Err(ParameterError::OutOfRange { .. })));
    }

    #[test]
    fn parse_accepts_whitespace_signs_and_exponents() {
        let parsed = Params::parse(&Inputs::new(" 1e3 ", "+100", "-0.5", " 12 ")).unwrap();
        assert_eq!(parsed, params("1000", "100", "-0.5", 12));
    }

    #[test]
    fn parse_reports_first_bad_field() {
        let err = Params::parse(&Inputs::new("1000", "abc", "x", "12")).unwrap_err();
        assert_eq!(
            err,
            ParameterError::NotANumber {
                field: Field::MonthlyContribution,
                input: "abc".to_owned(),
            }
        );
    }

    #[test]
    fn unrepresentable_numbers_are_range_errors() {
        let huge = "1".to_owned() + &"0".repeat(40);
        for (text, field) in [
            ("1e-40", Field::InitialValue),
            (huge.as_str(), Field::InitialValue),
        ] {
            let err = Params::parse(&Inputs::new(text, "100", "1", "12")).unwrap_err();
            assert_eq!(
                err,
                ParameterError::NumberOutOfRange {
                    field,
                    input: text.to_owned(),
                }
            );
        }

        let err = Params::parse(&Inputs::new("1000", "100", "1e-30", "12")).unwrap_err();
        assert!(matches!(
            err,
            ParameterError::NumberOutOfRange {
                field: Field::MonthlyRate,
                ..
            }
        ));

        let err = Params::parse(&Inputs::new("inf", "100", "1", "12")).unwrap_err();
        assert!(matches!(err, ParameterError::NotANumber { .. }));
    }

    #[test]
    fn fractional_months_are_not_integers() {
        let err = generate_from_inputs(&Inputs::new("1000", "100", "1", "12.0")).unwrap_err();
        assert!(matches!(
            err,
            ParameterError::NotAnInteger {
                field: Field::NumMonths,
                ..
            }
        ));
    }

    #[test]
    fn every_field_rejects_text() {
        for field in Field::ALL {
            let mut inputs = Inputs::new("1000", "100", "1", "12");
            *inputs.get_mut(field) = "dez".to_owned();
            assert!(generate_from_inputs(&inputs).is_err(), "{field}");
        }
        assert!(generate_from_inputs(&Inputs::default()).is_err());
    }

    #[test]
    fn formatting_rounds_half_away_from_zero() {
        assert_eq!(format_plain(dec("2.345")), "2.35");
        assert_eq!(format_plain(dec("-2.345")), "-2.35");
        assert_eq!(format_plain(dec("7")), "7.00");
        assert_eq!(format_plain(dec("1234567.891")), "1234567.89");
    }

    proptest! {
        #[test]
        fn recurrence_holds_for_every_month(
            initial in -10_000_000i64..10_000_000,
            contribution in -100_000i64..1_000_000,
            rate in -500i64..1_500,
            months in 0i64..120,
        ) {
            let p = Params {
                initial_value: Decimal::new(initial, 2),
                monthly_contribution: Decimal::new(contribution, 2),
                monthly_rate_percent: Decimal::new(rate, 2),
                num_months: months,
            };
            let schedule = generate(&p).unwrap();
            prop_assert_eq!(schedule.len(), months as usize);

            let rate = p.monthly_rate_percent / Decimal::ONE_HUNDRED;
            let mut previous = p.initial_value;
            for (i, entry) in schedule.entries().iter().enumerate() {
                prop_assert_eq!(entry.month as usize, i + 1);
                prop_assert_eq!(entry.contribution, p.monthly_contribution);
                let funded = previous + entry.contribution;
                prop_assert_eq!(entry.interest, funded * rate);
                prop_assert_eq!(entry.balance, funded + entry.interest);
                previous = entry.balance;
            }
        }
    }
}
