use std::time::Duration;

use leptos::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A transient, user-visible message. Views build these from server
/// `detail` messages or a generic fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NoticeKind::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NoticeKind::Error,
        }
    }
}

/// Clear the slot only if it still holds the notice the timer was armed
/// for; a newer notice keeps its own full display window.
fn dismiss_if_current(slot: &mut Option<Notice>, shown: &Notice) {
    if slot.as_ref() == Some(shown) {
        *slot = None;
    }
}

/// Toast area: shows the current notice and clears it five seconds after
/// it was set.
#[component]
pub fn Notification(
    notice: ReadSignal<Option<Notice>>,
    set_notice: WriteSignal<Option<Notice>>,
) -> impl IntoView {
    Effect::new(move |_| {
        if let Some(current) = notice.get() {
            set_timeout(
                move || set_notice.update(|slot| dismiss_if_current(slot, &current)),
                Duration::from_secs(5),
            );
        }
    });

    view! {
        {move || {
            notice.get().map(|n| {
                let class = match n.kind {
                    NoticeKind::Success => "notification notification-success",
                    NoticeKind::Error => "notification notification-error",
                };
                view! { <div class=class role="alert">{n.message}</div> }
            })
        }}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_timer_does_not_dismiss_a_newer_notice() {
        let first = Notice::error("launch failed");
        let second = Notice::success("task started");

        let mut slot = Some(second.clone());
        dismiss_if_current(&mut slot, &first);
        assert_eq!(slot, Some(second.clone()));

        dismiss_if_current(&mut slot, &second);
        assert_eq!(slot, None);

        // An already empty slot stays empty.
        dismiss_if_current(&mut slot, &first);
        assert_eq!(slot, None);
    }
}
