use serde::{Deserialize, Serialize};

/// Contributions per year assumed for SIP/ELSS when the investment leaves it unset.
pub const DEFAULT_FREQUENCY: u32 = 12;

/// Recurring deposits always compound on a monthly schedule.
pub const RD_MONTHS_PER_YEAR: u32 = 12;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InstrumentType {
    #[default]
    Fd,
    Sip,
    Ppf,
    Rd,
    Nsc,
    Elss,
}

/// The formula family an instrument is priced with.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Calculator {
    CompoundLumpSum,
    AnnuityDue,
    AnnualContribution,
    RecurringDeposit,
}

impl InstrumentType {
    pub const ALL: [InstrumentType; 6] = [
        InstrumentType::Fd,
        InstrumentType::Sip,
        InstrumentType::Ppf,
        InstrumentType::Rd,
        InstrumentType::Nsc,
        InstrumentType::Elss,
    ];

    pub const fn tag(self) -> &'static str {
        match self {
            InstrumentType::Fd => "FD",
            InstrumentType::Sip => "SIP",
            InstrumentType::Ppf => "PPF",
            InstrumentType::Rd => "RD",
            InstrumentType::Nsc => "NSC",
            InstrumentType::Elss => "ELSS",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            InstrumentType::Fd => "Fixed Deposit (FD)",
            InstrumentType::Sip => "Systematic Investment Plan (SIP)",
            InstrumentType::Ppf => "Public Provident Fund (PPF)",
            InstrumentType::Rd => "Recurring Deposit (RD)",
            InstrumentType::Nsc => "National Savings Certificate (NSC)",
            InstrumentType::Elss => "Equity Linked Savings Scheme (ELSS)",
        }
    }

    /// Rate in percent the input form pre-fills for this instrument.
    pub const fn default_rate(self) -> f64 {
        match self {
            InstrumentType::Fd => 6.5,
            InstrumentType::Sip => 12.0,
            InstrumentType::Ppf => 7.1,
            InstrumentType::Rd => 6.0,
            InstrumentType::Nsc => 6.8,
            InstrumentType::Elss => 15.0,
        }
    }

    /// NSC is priced like an FD and ELSS like a SIP.
    pub const fn calculator(self) -> Calculator {
        match self {
            InstrumentType::Fd | InstrumentType::Nsc => Calculator::CompoundLumpSum,
            InstrumentType::Sip | InstrumentType::Elss => Calculator::AnnuityDue,
            InstrumentType::Ppf => Calculator::AnnualContribution,
            InstrumentType::Rd => Calculator::RecurringDeposit,
        }
    }

    /// Whether `principal` is a per-period deposit rather than a lump sum.
    pub const fn is_recurring(self) -> bool {
        matches!(
            self.calculator(),
            Calculator::AnnuityDue | Calculator::RecurringDeposit
        )
    }

    /// Exact, case-sensitive match on the upper-case tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// Unknown tags price as an FD instead of failing.
    pub fn from_tag_or_default(tag: &str) -> Self {
        Self::from_tag(tag).unwrap_or_else(|| {
            log::debug!("unrecognised instrument type {tag:?}, pricing as FD");
            Self::default()
        })
    }
}

impl From<String> for InstrumentType {
    fn from(value: String) -> Self {
        Self::from_tag_or_default(&value)
    }
}

impl From<InstrumentType> for String {
    fn from(value: InstrumentType) -> Self {
        value.tag().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Investment {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub instrument: InstrumentType,
    pub principal: f64,
    pub rate: f64,
    pub time: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_in: Option<u32>,
    #[serde(default)]
    pub tax_benefit: bool,
}

impl Investment {
    /// Deposits made per year. A zero frequency is treated as unset.
    pub fn contributions_per_year(&self) -> u32 {
        match self.instrument.calculator() {
            Calculator::CompoundLumpSum | Calculator::AnnualContribution => 1,
            Calculator::AnnuityDue => self
                .frequency
                .filter(|&f| f > 0)
                .unwrap_or(DEFAULT_FREQUENCY),
            Calculator::RecurringDeposit => RD_MONTHS_PER_YEAR,
        }
    }

    /// Principal paid in over the whole horizon.
    pub fn total_contributed(&self) -> f64 {
        match self.instrument.calculator() {
            Calculator::CompoundLumpSum => self.principal,
            Calculator::AnnualContribution
            | Calculator::AnnuityDue
            | Calculator::RecurringDeposit => {
                self.principal * f64::from(self.time) * f64::from(self.contributions_per_year())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyData {
    pub year: u32,
    pub amount: f64,
    pub interest: f64,
    pub total_invested: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentResult {
    pub investment: Investment,
    pub maturity_amount: f64,
    pub total_interest: f64,
    pub yearly_breakdown: Vec<YearlyData>,
}

impl InvestmentResult {
    pub fn total_invested(&self) -> f64 {
        self.investment.total_contributed()
    }

    /// Interest as a percentage of principal paid in; zero when nothing was paid in.
    pub fn total_return_pct(&self) -> f64 {
        let invested = self.total_invested();
        if invested == 0.0 {
            return 0.0;
        }
        self.total_interest / invested * 100.0
    }
}
