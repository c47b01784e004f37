//! Integration tests for `DieselIdentityRepository` against embedded PostgreSQL.
//!
//! Each test provisions its own database cloned from the migrated template.
//! Set `SKIP_TEST_CLUSTER=1` to skip them where PostgreSQL cannot start.

use chrono::{DateTime, TimeZone, Utc};
use nightlist::domain::ports::{IdentityRepository, IdentityRepositoryError};
use nightlist::domain::{
    Age, Email, FullName, Identity, IdentityDraft, IdentityFilter, ImageBlob, ReviewDecision,
    ReviewState, Role, RoleProfile, UserId, VerificationStatus,
};
use nightlist::outbound::persistence::DieselIdentityRepository;
use rstest::{fixture, rstest};

#[allow(dead_code)]
#[path = "support/embedded_postgres.rs"]
mod embedded_postgres;

use embedded_postgres::DieselContext;

fn at(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 1, 20, minute, 0)
        .single()
        .expect("valid timestamp")
}

fn identity(role: Role, email: &str, minute: u32) -> Identity {
    Identity::new(
        IdentityDraft {
            id: UserId::random(),
            email: Email::new(email).expect("email"),
            full_name: FullName::new("Diesel Person").expect("name"),
            age: Age::new(30).expect("age"),
            created_at: at(minute),
        },
        RoleProfile::for_role(role),
    )
}

fn document(byte: u8) -> ImageBlob {
    ImageBlob::from_stored("image/png".to_owned(), vec![byte; 4])
}

fn submitted(mut user: Identity, byte: u8, minute: u32) -> Identity {
    user.verification_mut()
        .expect("user record")
        .submit(document(byte), at(minute))
        .expect("submit");
    user
}

#[fixture]
fn diesel_world() -> Option<DieselContext> {
    embedded_postgres::diesel_context()
}

#[rstest]
fn identities_round_trip_with_their_hash(diesel_world: Option<DieselContext>) {
    let Some(world) = diesel_world else {
        eprintln!("SKIP-TEST-CLUSTER: identities_round_trip_with_their_hash skipped");
        return;
    };
    let user = submitted(identity(Role::User, "ada@example.com", 0), 7, 1);

    world.run(|pool| async move {
        let repo = DieselIdentityRepository::new(pool);
        repo.insert(&user, "$argon2id$hash").await.expect("insert");

        let found = repo.find_by_id(user.id()).await.expect("find");
        assert_eq!(found.as_ref(), Some(&user));
        let credentials = repo
            .find_credentials(user.email())
            .await
            .expect("credentials")
            .expect("present");
        assert_eq!(credentials.identity, user);
        assert_eq!(credentials.password_hash, "$argon2id$hash");
    });
}

#[rstest]
fn duplicate_emails_map_to_a_port_error(diesel_world: Option<DieselContext>) {
    let Some(world) = diesel_world else {
        eprintln!("SKIP-TEST-CLUSTER: duplicate_emails_map_to_a_port_error skipped");
        return;
    };
    let first = identity(Role::User, "dup@example.com", 0);
    let second = identity(Role::Vendor, "dup@example.com", 1);

    world.run(|pool| async move {
        let repo = DieselIdentityRepository::new(pool);
        repo.insert(&first, "h").await.expect("first insert");
        let err = repo.insert(&second, "h").await.expect_err("duplicate");
        assert!(
            matches!(err, IdentityRepositoryError::DuplicateEmail { .. }),
            "expected DuplicateEmail, got {err:?}"
        );
    });
}

#[rstest]
fn resubmission_clears_the_stored_review_comment(diesel_world: Option<DieselContext>) {
    let Some(world) = diesel_world else {
        eprintln!("SKIP-TEST-CLUSTER: resubmission_clears_the_stored_review_comment skipped");
        return;
    };
    let user = submitted(identity(Role::User, "resubmit@example.com", 0), 1, 1);

    world.run(|pool| async move {
        let repo = DieselIdentityRepository::new(pool);
        repo.insert(&user, "h").await.expect("insert");

        let mut reviewed = user.clone();
        reviewed
            .verification_mut()
            .expect("user record")
            .review(ReviewDecision::Reject, Some("Blurry photo".to_owned()));
        repo.save(&reviewed).await.expect("save review");
        let stored = repo.find_by_id(user.id()).await.expect("find").expect("present");
        let record = stored.verification().expect("user record");
        assert_eq!(record.state(), ReviewState::Rejected);
        assert_eq!(record.comment(), Some("Blurry photo"));

        let resubmitted = submitted(stored, 2, 5);
        repo.save(&resubmitted).await.expect("save resubmission");
        let reloaded = repo.find_by_id(user.id()).await.expect("find").expect("present");
        let current = reloaded.verification().expect("user record");
        assert_eq!(current.state(), ReviewState::Pending);
        assert_eq!(current.comment(), None);
        assert_eq!(current.document(), Some(&document(2)));
        assert_eq!(current.submitted_at(), Some(at(5)));
    });
}

fn seed_directory() -> Vec<Identity> {
    vec![
        identity(Role::Admin, "admin@example.com", 0),
        identity(Role::Vendor, "vendor@example.com", 1),
        identity(Role::User, "no-document@example.com", 2),
        submitted(identity(Role::User, "pending@example.com", 3), 1, 4),
        {
            let mut approved = submitted(identity(Role::User, "approved@example.com", 5), 1, 6);
            approved
                .verification_mut()
                .expect("user record")
                .review(ReviewDecision::Approve, None);
            approved
        },
    ]
}

#[rstest]
#[case::role(
    IdentityFilter { role: Some(Role::User), status: None },
    &["approved@example.com", "pending@example.com", "no-document@example.com"],
)]
#[case::status(
    IdentityFilter { role: None, status: Some(VerificationStatus::Approved) },
    &["approved@example.com"],
)]
#[case::not_applicable(
    IdentityFilter { role: None, status: Some(VerificationStatus::NotApplicable) },
    &["vendor@example.com", "admin@example.com"],
)]
#[case::pending_users(
    IdentityFilter { role: Some(Role::User), status: Some(VerificationStatus::Pending) },
    &["pending@example.com", "no-document@example.com"],
)]
fn directory_filters_apply_role_and_status(
    diesel_world: Option<DieselContext>,
    #[case] filter: IdentityFilter,
    #[case] expected: &[&str],
) {
    let Some(world) = diesel_world else {
        eprintln!("SKIP-TEST-CLUSTER: directory_filters_apply_role_and_status skipped");
        return;
    };
    let wanted: Vec<String> = expected.iter().map(|email| (*email).to_owned()).collect();

    world.run(|pool| async move {
        let repo = DieselIdentityRepository::new(pool);
        for person in seed_directory() {
            repo.insert(&person, "h").await.expect("insert");
        }

        let listed: Vec<String> = repo
            .list(filter)
            .await
            .expect("list")
            .iter()
            .map(|person| person.email().as_ref().to_owned())
            .collect();
        assert_eq!(listed, wanted);
    });
}

#[rstest]
fn pending_queue_requires_a_submitted_document(diesel_world: Option<DieselContext>) {
    let Some(world) = diesel_world else {
        eprintln!("SKIP-TEST-CLUSTER: pending_queue_requires_a_submitted_document skipped");
        return;
    };

    world.run(|pool| async move {
        let repo = DieselIdentityRepository::new(pool);
        for person in seed_directory() {
            repo.insert(&person, "h").await.expect("insert");
        }

        let pending = repo.list_pending_verifications().await.expect("list");
        let emails: Vec<&str> = pending.iter().map(|person| person.email().as_ref()).collect();
        assert_eq!(emails, vec!["pending@example.com"]);
    });
}

#[rstest]
fn role_listing_excludes_the_caller(diesel_world: Option<DieselContext>) {
    let Some(world) = diesel_world else {
        eprintln!("SKIP-TEST-CLUSTER: role_listing_excludes_the_caller skipped");
        return;
    };
    let directory = seed_directory();
    let caller = *directory[2].id();

    world.run(|pool| async move {
        let repo = DieselIdentityRepository::new(pool);
        for person in &directory {
            repo.insert(person, "h").await.expect("insert");
        }

        let others = repo
            .list_by_role_excluding(Role::User, &caller)
            .await
            .expect("list");
        assert_eq!(others.len(), 2);
        assert!(others.iter().all(|person| person.id() != &caller));
    });
}
