//! Shared fixtures for domain service tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{
    Age, Email, FullName, Identity, IdentityDraft, Role, RoleProfile, UserId,
};

pub(crate) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 21, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

pub(crate) struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_timestamp(),
    })
}

/// Build an identity with a default profile for `role`.
pub(crate) fn identity(role: Role, email: &str) -> Identity {
    Identity::new(
        IdentityDraft {
            id: UserId::random(),
            email: Email::new(email).expect("fixture email"),
            full_name: FullName::new("Fixture Person").expect("fixture name"),
            age: Age::new(25).expect("fixture age"),
            created_at: fixture_timestamp(),
        },
        RoleProfile::for_role(role),
    )
}
