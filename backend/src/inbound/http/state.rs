//! Shared HTTP adapter state.
//!
//! Handlers receive this via `web::Data` and only reach infrastructure through
//! the domain services it bundles. The server and test harnesses build it
//! from [`HttpStatePorts`], so every caller wires the services identically.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    ConversationRepository, EventRepository, FeedbackRepository, IdentityRepository,
    MessageNotifier, PasswordHasher, ResetCodeMailer, ResetCodeRepository, TokenCodec,
};
use crate::domain::{
    AccessGuard, AccountService, AccountServicePorts, FeedbackService, MessagingService,
    ModerationService, VerificationService,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub guard: Arc<AccessGuard>,
    pub accounts: Arc<AccountService>,
    pub verification: Arc<VerificationService>,
    pub moderation: Arc<ModerationService>,
    pub messaging: Arc<MessagingService>,
    pub feedback: Arc<FeedbackService>,
}

/// Port implementations used to construct [`HttpState`].
#[derive(Clone)]
pub struct HttpStatePorts {
    pub identities: Arc<dyn IdentityRepository>,
    pub events: Arc<dyn EventRepository>,
    pub conversations: Arc<dyn ConversationRepository>,
    pub feedback: Arc<dyn FeedbackRepository>,
    pub reset_codes: Arc<dyn ResetCodeRepository>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub tokens: Arc<dyn TokenCodec>,
    pub mailer: Arc<dyn ResetCodeMailer>,
    pub notifier: Arc<dyn MessageNotifier>,
    pub clock: Arc<dyn Clock>,
}

impl HttpState {
    /// Construct every service from explicit port implementations.
    #[must_use]
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            identities,
            events,
            conversations,
            feedback,
            reset_codes,
            hasher,
            tokens,
            mailer,
            notifier,
            clock,
        } = ports;
        Self {
            guard: Arc::new(AccessGuard::new(tokens.clone(), identities.clone())),
            accounts: Arc::new(AccountService::new(
                AccountServicePorts {
                    identities: identities.clone(),
                    hasher,
                    tokens,
                    reset_codes,
                    mailer,
                },
                clock.clone(),
            )),
            verification: Arc::new(VerificationService::new(identities.clone(), clock.clone())),
            moderation: Arc::new(ModerationService::new(events, clock.clone())),
            messaging: Arc::new(MessagingService::new(
                identities.clone(),
                conversations,
                notifier,
                clock.clone(),
            )),
            feedback: Arc::new(FeedbackService::new(feedback, identities, clock)),
        }
    }
}
