use std::{collections::VecDeque, fmt};

use compact_str::CompactString;

use crate::event::{ChangeEvent, PulseEvent};

#[derive(Debug)]
pub struct NoticeService {
    info_notices: VecDeque<Notice>,
    error_notices: VecDeque<Notice>,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: NoticeMessage,
}

#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub enum NoticeMessage {
    RepositoriesLoaded(usize),
    RepositoryChanged(ChangeEvent),
    RequestFailed(u16, Option<CompactString>),
    RateLimited(i64),
}

impl NoticeService {
    pub fn new() -> Self {
        Self {
            info_notices: VecDeque::new(),
            error_notices: VecDeque::new(),
        }
    }

    pub fn apply(&mut self, event: &PulseEvent) {
        match event {
            PulseEvent::RepositoriesLoaded(repos) => self.push_notice(
                NoticeLevel::Info,
                NoticeMessage::RepositoriesLoaded(repos.len()),
            ),
            PulseEvent::RepositoryChanged(change) => self.push_notice(
                NoticeLevel::Info,
                NoticeMessage::RepositoryChanged(change.clone()),
            ),
            PulseEvent::RequestFailed { status, message } => self.push_notice(
                NoticeLevel::Error,
                NoticeMessage::RequestFailed(*status, message.clone()),
            ),
            PulseEvent::RateLimited { minutes_until_reset } => self.push_notice(
                NoticeLevel::Error,
                NoticeMessage::RateLimited(*minutes_until_reset),
            ),
        }
    }

    pub fn pop_notice(&mut self) -> Option<Notice> {
        self.error_notices
            .pop_front()
            .or_else(|| self.info_notices.pop_front())
    }

    pub fn push_notice(&mut self, level: NoticeLevel, message: NoticeMessage) {
        let notice = Notice { level, message };

        match level {
            NoticeLevel::Info => self.info_notices.push_back(notice),
            NoticeLevel::Error => self.error_notices.push_back(notice),
        }
    }
}

impl Default for NoticeService {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NoticeMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoticeMessage::RepositoriesLoaded(count) => write!(f, "Loaded {count} repositories"),
            NoticeMessage::RepositoryChanged(change) if change.content.is_empty() => {
                write!(f, "{} ({})", change.kind, change.link_url)
            },
            NoticeMessage::RepositoryChanged(change) => {
                write!(f, "{}: {} ({})", change.kind, change.content, change.link_url)
            },
            NoticeMessage::RequestFailed(status, Some(message)) => {
                write!(f, "GitHub request failed [{status}]: {message}")
            },
            NoticeMessage::RequestFailed(status, None) => {
                write!(f, "GitHub request failed [{status}]")
            },
            NoticeMessage::RateLimited(minutes) => {
                write!(f, "API rate limit exceeded, next refresh in {minutes} minutes")
            },
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            NoticeLevel::Info => write!(f, "{}", self.message),
            NoticeLevel::Error => write!(f, "error: {}", self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ChangeKind;

    fn change(kind: ChangeKind, content: &str) -> PulseEvent {
        PulseEvent::RepositoryChanged(ChangeEvent {
            kind,
            content: content.into(),
            link_url: "https://github.com/octocat/a/issues".into(),
        })
    }

    #[test]
    fn errors_are_popped_before_info() {
        let mut notices = NoticeService::new();
        notices.apply(&change(ChangeKind::IssuesFallen, "a"));
        notices.apply(&PulseEvent::RequestFailed { status: 500, message: None });

        assert_eq!(notices.pop_notice().unwrap().level, NoticeLevel::Error);
        assert_eq!(notices.pop_notice().unwrap().level, NoticeLevel::Info);
        assert!(notices.pop_notice().is_none());
    }

    #[test]
    fn change_notice_shows_label_content_and_link() {
        let mut notices = NoticeService::new();
        notices.apply(&change(ChangeKind::IssuesFallen, "a"));
        notices.apply(&change(ChangeKind::IssuesGrown, ""));

        assert_eq!(
            notices.pop_notice().unwrap().to_string(),
            "Issues Fallen: a (https://github.com/octocat/a/issues)"
        );
        assert_eq!(
            notices.pop_notice().unwrap().to_string(),
            "Issues Grown (https://github.com/octocat/a/issues)"
        );
    }

    #[test]
    fn rate_limit_notice_counts_down_minutes() {
        let mut notices = NoticeService::new();
        notices.apply(&PulseEvent::RateLimited { minutes_until_reset: 3 });

        assert_eq!(
            notices.pop_notice().unwrap().to_string(),
            "error: API rate limit exceeded, next refresh in 3 minutes"
        );
    }
}
