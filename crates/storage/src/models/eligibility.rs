use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Why a registration or cancellation was refused. Each reason has exactly one user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    NotOpen,
    DeadlinePassed,
    AlreadyRegistered,
    Blacklisted,
    Full,
    PastCancelDeadline,
    NotRegistered,
}

impl DenialReason {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotOpen => "not_open",
            Self::DeadlinePassed => "deadline_passed",
            Self::AlreadyRegistered => "already_registered",
            Self::Blacklisted => "blacklisted",
            Self::Full => "full",
            Self::PastCancelDeadline => "past_cancel_deadline",
            Self::NotRegistered => "not_registered",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::NotOpen => "This activity is not open for registration",
            Self::DeadlinePassed => "The registration deadline for this activity has passed",
            Self::AlreadyRegistered => "You are already registered for this activity",
            Self::Blacklisted => {
                "Your credit score is too low to register for activities. Please contact an administrator"
            }
            Self::Full => "This activity has reached its maximum number of participants",
            Self::PastCancelDeadline => "It is too late to cancel your registration for this activity",
            Self::NotRegistered => "You are not registered for this activity",
        }
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    Denied(DenialReason),
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Self::Eligible)
    }

    pub fn denial(&self) -> Option<DenialReason> {
        match self {
            Self::Eligible => None,
            Self::Denied(reason) => Some(*reason),
        }
    }
}
