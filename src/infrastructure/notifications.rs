use crate::infrastructure::error::InfraError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    Undetermined,
}

impl PermissionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Granted => "granted",
            Self::Denied => "denied",
            Self::Undetermined => "undetermined",
        }
    }
}

/// Platform notification permission seam. Queried once at startup; routines
/// carry a notifications flag but scheduling/delivery belongs to whichever
/// shell embeds this core.
pub trait NotificationGateway: Send + Sync {
    fn permission_status(&self) -> Result<PermissionStatus, InfraError>;
    fn request_permission(&self) -> Result<PermissionStatus, InfraError>;
}

/// Headless default: nothing to grant, nothing to deliver.
#[derive(Debug, Default)]
pub struct UnsupportedNotificationGateway;

impl NotificationGateway for UnsupportedNotificationGateway {
    fn permission_status(&self) -> Result<PermissionStatus, InfraError> {
        Ok(PermissionStatus::Denied)
    }

    fn request_permission(&self) -> Result<PermissionStatus, InfraError> {
        Ok(PermissionStatus::Denied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_gateway_always_denies() {
        let gateway = UnsupportedNotificationGateway;
        assert_eq!(
            gateway.permission_status().expect("status"),
            PermissionStatus::Denied
        );
        assert_eq!(
            gateway.request_permission().expect("request"),
            PermissionStatus::Denied
        );
    }
}
