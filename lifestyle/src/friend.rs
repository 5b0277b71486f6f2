use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::events::{AppEvent, EventBus};
use crate::moments::Author;
use crate::profile::{LOGGED_IN_KEY, USER_PHONE_KEY};
use crate::store::{KeyValueStore, StoreError, read_json, read_text, write_json};
use crate::validation::{ValidationError, require, validate_phone};

pub const FRIEND_KEY: &str = "friendInfo";
pub const FRIEND_NICKNAME_KEY: &str = "friendNickname";
pub const FRIEND_AVATAR_KEY: &str = "friendAvatar";
pub const MESSAGES_KEY: &str = "friendMsgs";

/// Path appended to the configured base when building a link.
pub const INVITE_PATH: &str = "invite";
pub const INVITE_PARAM: &str = "from";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendInfo {
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendMessage {
    pub id: String,
    pub author: Author,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum InviteError {
    #[error("invitation link is invalid")]
    InvalidLink,
    #[error("a friend is already linked")]
    AlreadyHasFriend,
    #[error("log in before accepting an invitation")]
    NotLoggedIn,
    #[error("cannot accept your own invitation")]
    SelfInvite,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// `<base>/invite?from=<phone>` with the phone url-encoded.
pub fn invite_link(base: &str, phone: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .push(INVITE_PATH);
    url.set_query(None);
    url.query_pairs_mut().append_pair(INVITE_PARAM, phone);
    Ok(url)
}

/// The inviter's phone carried by `link`. Bare paths such as
/// `/invite?from=...` are accepted as well as absolute URLs.
pub fn inviter_phone(link: &str) -> Option<String> {
    let url = Url::parse(link).or_else(|_| {
        Url::parse("http://localhost/").and_then(|root| root.join(link))
    });
    let url = url.ok()?;
    url.query_pairs()
        .find(|(key, _)| key == INVITE_PARAM)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Nickname given to a friend added through an invitation.
pub fn invited_nickname(phone: &str) -> String {
    let chars: Vec<char> = phone.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("Friend ({tail})")
}

/// The single friend relationship and its chat log.
pub struct Friends<'s> {
    store: &'s mut dyn KeyValueStore,
    events: Option<EventBus>,
}

impl<'s> Friends<'s> {
    pub fn new(store: &'s mut dyn KeyValueStore) -> Self {
        Self { store, events: None }
    }

    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn friend(&self) -> Option<FriendInfo> {
        read_json::<Option<FriendInfo>>(&*self.store, FRIEND_KEY)
    }

    /// Writes the record plus the nickname and avatar mirrors read by other
    /// screens.
    fn save_friend(&mut self, info: &FriendInfo) -> Result<(), StoreError> {
        write_json(self.store, FRIEND_KEY, info)?;
        self.store.set(
            FRIEND_NICKNAME_KEY,
            info.nickname.clone().unwrap_or_default(),
        )?;
        self.store
            .set(FRIEND_AVATAR_KEY, info.avatar.clone().unwrap_or_default())?;
        if let Some(events) = &self.events {
            events.publish(AppEvent::FriendUpdated);
        }
        Ok(())
    }

    /// Links a friend by phone, replacing any existing one.
    pub fn add(&mut self, phone: &str, nickname: &str) -> Result<FriendInfo, ValidationError> {
        let nickname = nickname.trim();
        let info = FriendInfo {
            phone: validate_phone(phone)?,
            nickname: (!nickname.is_empty()).then(|| nickname.to_string()),
            avatar: None,
        };
        self.save_friend(&info)?;
        debug!("friend linked");
        Ok(info)
    }

    pub fn set_nickname(&mut self, nickname: &str) -> Result<FriendInfo, ValidationError> {
        let nickname = nickname.trim();
        self.update(|info| FriendInfo {
            nickname: (!nickname.is_empty()).then(|| nickname.to_string()),
            ..info
        })
    }

    pub fn set_avatar(&mut self, avatar: &str) -> Result<FriendInfo, ValidationError> {
        let avatar = avatar.trim();
        self.update(|info| FriendInfo {
            avatar: (!avatar.is_empty()).then(|| avatar.to_string()),
            ..info
        })
    }

    fn update<F>(&mut self, change: F) -> Result<FriendInfo, ValidationError>
    where
        F: FnOnce(FriendInfo) -> FriendInfo,
    {
        let current = self
            .friend()
            .ok_or_else(|| ValidationError::NotFound(FRIEND_KEY.to_string()))?;
        let updated = change(current);
        self.save_friend(&updated)?;
        Ok(updated)
    }

    /// Unlinks the friend and drops the chat log.
    pub fn remove(&mut self) -> Result<(), StoreError> {
        for key in [FRIEND_KEY, FRIEND_AVATAR_KEY, FRIEND_NICKNAME_KEY, MESSAGES_KEY] {
            self.store.remove(key)?;
        }
        if let Some(events) = &self.events {
            events.publish(AppEvent::FriendUpdated);
        }
        Ok(())
    }

    /// Oldest first.
    pub fn messages(&self) -> Vec<FriendMessage> {
        read_json(&*self.store, MESSAGES_KEY)
    }

    pub fn send(
        &mut self,
        author: Author,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<FriendMessage, ValidationError> {
        let message = FriendMessage {
            id: uuid::Uuid::new_v4().to_string(),
            author,
            text: require("message", text)?,
            created_at: now,
        };
        let mut next = self.messages();
        next.push(message.clone());
        write_json(self.store, MESSAGES_KEY, &next)?;
        Ok(message)
    }

    /// Establishes the friendship carried by an invitation link. The checks
    /// run in order: link shape, existing friend, login, self-invite.
    pub fn accept_invite(&mut self, link: &str) -> Result<FriendInfo, InviteError> {
        let from = inviter_phone(link).ok_or(InviteError::InvalidLink)?;
        if self.store.get(FRIEND_KEY).is_some() {
            return Err(InviteError::AlreadyHasFriend);
        }
        let logged_in = read_text(&*self.store, LOGGED_IN_KEY).is_some();
        let Some(user_phone) = read_text(&*self.store, USER_PHONE_KEY).filter(|_| logged_in)
        else {
            return Err(InviteError::NotLoggedIn);
        };
        if user_phone == from {
            return Err(InviteError::SelfInvite);
        }

        let info = FriendInfo {
            nickname: Some(invited_nickname(&from)),
            phone: from,
            avatar: None,
        };
        self.save_friend(&info)?;
        info!("invitation accepted");
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_encodes_phone_under_invite_path() {
        let url = invite_link("https://couple.example/app/", "+8613812345678").unwrap();
        assert_eq!(
            url.as_str(),
            "https://couple.example/app/invite?from=%2B8613812345678"
        );
        assert_eq!(inviter_phone(url.as_str()).as_deref(), Some("+8613812345678"));
    }

    #[test]
    fn relative_links_are_understood() {
        assert_eq!(
            inviter_phone("/invite?from=13800001111").as_deref(),
            Some("13800001111")
        );
        assert_eq!(inviter_phone("/invite?from="), None);
        assert_eq!(inviter_phone("/invite"), None);
    }

    #[test]
    fn invited_nickname_uses_last_four_digits() {
        assert_eq!(invited_nickname("13800001111"), "Friend (1111)");
        assert_eq!(invited_nickname("12"), "Friend (12)");
    }
}
