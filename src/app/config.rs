use std::fmt::{Display, Formatter};

pub const CURRENCY: &str = "R$";

pub struct Config {
    pub title: String,
    pub window_size: [f32; 2],
    pub chart: ChartConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "Cronograma de Investimentos".to_owned(),
            window_size: [800.0, 600.0],
            chart: ChartConfig::default(),
        }
    }
}

/// Styling shared by the on-screen plot and the exported image.
#[derive(Clone)]
pub struct ChartConfig {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub color: (u8, u8, u8),
    pub marker_radius: u32,
    pub size: (u32, u32),
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            title: "Evolução do Saldo".to_owned(),
            x_label: "Mês".to_owned(),
            y_label: format!("Saldo ({CURRENCY})"),
            color: (0x00, 0x77, 0xcc),
            marker_radius: 3,
            size: (800, 480),
        }
    }
}

#[derive(Default, Clone)]
pub struct Inputs {
    pub initial_value: String,
    pub monthly_contribution: String,
    pub monthly_rate: String,
    pub num_months: String,
}

impl Inputs {
    #[cfg(test)]
    pub fn new(
        initial_value: &str,
        monthly_contribution: &str,
        monthly_rate: &str,
        num_months: &str,
    ) -> Self {
        Self {
            initial_value: initial_value.to_owned(),
            monthly_contribution: monthly_contribution.to_owned(),
            monthly_rate: monthly_rate.to_owned(),
            num_months: num_months.to_owned(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::InitialValue => &self.initial_value,
            Field::MonthlyContribution => &self.monthly_contribution,
            Field::MonthlyRate => &self.monthly_rate,
            Field::NumMonths => &self.num_months,
        }
    }

    pub fn get_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::InitialValue => &mut self.initial_value,
            Field::MonthlyContribution => &mut self.monthly_contribution,
            Field::MonthlyRate => &mut self.monthly_rate,
            Field::NumMonths => &mut self.num_months,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Field {
    InitialValue,
    MonthlyContribution,
    MonthlyRate,
    NumMonths,
}

impl Field {
    /// Display order of the form.
    pub const ALL: [Field; 4] = [
        Field::InitialValue,
        Field::MonthlyContribution,
        Field::MonthlyRate,
        Field::NumMonths,
    ];

    pub fn hint(&self) -> String {
        match self {
            Field::InitialValue => format!("Valor inicial ({CURRENCY})"),
            Field::MonthlyContribution => format!("Aporte mensal ({CURRENCY})"),
            Field::MonthlyRate => "Taxa de juros mensal (%)".to_owned(),
            Field::NumMonths => "Duração (em meses)".to_owned(),
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::InitialValue => write!(f, "valor inicial"),
            Field::MonthlyContribution => write!(f, "aporte mensal"),
            Field::MonthlyRate => write!(f, "taxa de juros"),
            Field::NumMonths => write!(f, "duração"),
        }
    }
}
