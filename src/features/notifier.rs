use super::alerts::PriceDropAlert;
use anyhow::Result;
use tracing::info;

/// Delivers triggered price-drop alerts to the user.
pub trait Notifier: Send + Sync {
    fn notify(&self, alert: &PriceDropAlert) -> Result<()>;
}

/// Writes alerts to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, alert: &PriceDropAlert) -> Result<()> {
        info!("🔔 {} {} ({})", alert.headline(), alert.message(), alert.url);
        Ok(())
    }
}

/// Native desktop notification through the platform notification service.
#[cfg(feature = "desktop-notify")]
#[derive(Debug, Default, Clone, Copy)]
pub struct DesktopNotifier;

#[cfg(feature = "desktop-notify")]
impl Notifier for DesktopNotifier {
    fn notify(&self, alert: &PriceDropAlert) -> Result<()> {
        notify_rust::Notification::new()
            .summary(alert.headline())
            .body(&alert.message())
            .show()
            .map_err(|e| anyhow::anyhow!("desktop notification failed: {}", e))?;
        Ok(())
    }
}

/// Desktop notifications when built with `desktop-notify` and enabled via
/// `PRICEWATCH_DESKTOP_NOTIFY`; the log otherwise.
pub fn default_notifier() -> Box<dyn Notifier> {
    #[cfg(feature = "desktop-notify")]
    {
        if crate::core::config::desktop_notifications_enabled() {
            return Box::new(DesktopNotifier);
        }
    }
    Box::new(LogNotifier)
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn notify(&self, alert: &PriceDropAlert) -> Result<()> {
        (**self).notify(alert)
    }
}
