pub mod congregation;
pub mod member;
pub mod notification;
pub mod pending_action;
pub mod preferences;
pub mod session;

pub use congregation::{Congregation, Principal};
pub use member::{Gender, Member, MemberUpdate};
pub use notification::{Notification, NotificationType};
pub use pending_action::{ActionKind, ChallengePrompt, PendingAction};
pub use preferences::SecurityPreferences;
pub use session::Session;
