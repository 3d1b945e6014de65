//! Slash command definitions and option parsing.
//!
//! Every command requires Manage Events and is only offered inside guilds.
//! Option parsing is kept free of serenity types so it can be tested directly.

use calbot_core::FilterField;
use serenity::builder::{CreateCommand, CreateCommandOption};
use serenity::model::Permissions;
use serenity::model::application::CommandOptionType;
use thiserror::Error;

pub const SUBSCRIBE: &str = "subscribe";
pub const UNSUBSCRIBE: &str = "unsubscribe";
pub const FILTER: &str = "filter";
pub const UNFILTER: &str = "unfilter";
pub const EVENTS: &str = "events";
pub const FILTERS: &str = "filters";

/// A validated slash command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Subscribe {
        url: String,
        /// `(field, pattern)`, both present or both absent.
        filter: Option<(String, String)>,
    },
    Unsubscribe {
        url: String,
    },
    Filter {
        url: String,
        field: String,
        pattern: String,
    },
    Unfilter {
        url: String,
        field: String,
        pattern: String,
    },
    Events {
        url: String,
    },
    Filters {
        url: String,
    },
}

impl SlashCommand {
    pub fn url(&self) -> &str {
        match self {
            Self::Subscribe { url, .. }
            | Self::Unsubscribe { url }
            | Self::Filter { url, .. }
            | Self::Unfilter { url, .. }
            | Self::Events { url }
            | Self::Filters { url } => url,
        }
    }
}

/// The options of an invocation are incomplete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("missing URL")]
    MissingUrl,

    #[error("missing filter option `{0}`")]
    MissingOption(&'static str),

    #[error("unknown command `{0}`")]
    UnknownCommand(String),
}

/// Builds the definitions registered with Discord.
pub fn definitions() -> Vec<CreateCommand> {
    vec![
        command(SUBSCRIBE, "Subscribe CalendarBot to a remote calendar")
            .add_option(url_option())
            .add_option(field_option(false))
            .add_option(pattern_option(false)),
        command(UNSUBSCRIBE, "Unsubscribe CalendarBot from a remote calendar")
            .add_option(url_option()),
        command(FILTER, "Add filter to existing calendar and reprocess events")
            .add_option(url_option())
            .add_option(field_option(true))
            .add_option(pattern_option(true)),
        command(UNFILTER, "Remove a filter from a calendar")
            .add_option(url_option())
            .add_option(field_option(true))
            .add_option(pattern_option(true)),
        command(EVENTS, "List the scheduled events created from a calendar")
            .add_option(url_option()),
        command(FILTERS, "List the filters of a calendar").add_option(url_option()),
    ]
}

fn command(name: &str, description: &str) -> CreateCommand {
    CreateCommand::new(name)
        .description(description)
        .default_member_permissions(Permissions::MANAGE_EVENTS)
        .dm_permission(false)
}

fn url_option() -> CreateCommandOption {
    CreateCommandOption::new(CommandOptionType::String, "url", "URL for remote calendar")
        .required(true)
}

fn field_option(required: bool) -> CreateCommandOption {
    FilterField::ALL.into_iter().fold(
        CreateCommandOption::new(CommandOptionType::String, "field", "field to filter on")
            .required(required),
        |option, field| option.add_string_choice(field.as_str(), field.as_str()),
    )
}

fn pattern_option(required: bool) -> CreateCommandOption {
    CreateCommandOption::new(
        CommandOptionType::String,
        "pattern",
        "filter pattern (regular expression)",
    )
    .required(required)
}

fn option<'a>(options: &'a [(String, String)], name: &str) -> Option<&'a str> {
    options
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

fn required(options: &[(String, String)], name: &'static str) -> Result<String, InputError> {
    option(options, name)
        .map(str::to_string)
        .ok_or(InputError::MissingOption(name))
}

/// Parses a command name and its string options.
pub fn parse(name: &str, options: &[(String, String)]) -> Result<SlashCommand, InputError> {
    let url = || {
        option(options, "url")
            .map(str::to_string)
            .ok_or(InputError::MissingUrl)
    };

    match name {
        SUBSCRIBE => {
            let url = url()?;
            let filter = match (option(options, "field"), option(options, "pattern")) {
                (Some(field), Some(pattern)) => Some((field.to_string(), pattern.to_string())),
                (Some(_), None) => return Err(InputError::MissingOption("pattern")),
                (None, Some(_)) => return Err(InputError::MissingOption("field")),
                (None, None) => None,
            };
            Ok(SlashCommand::Subscribe { url, filter })
        }
        UNSUBSCRIBE => Ok(SlashCommand::Unsubscribe { url: url()? }),
        FILTER => Ok(SlashCommand::Filter {
            url: url()?,
            field: required(options, "field")?,
            pattern: required(options, "pattern")?,
        }),
        UNFILTER => Ok(SlashCommand::Unfilter {
            url: url()?,
            field: required(options, "field")?,
            pattern: required(options, "pattern")?,
        }),
        EVENTS => Ok(SlashCommand::Events { url: url()? }),
        FILTERS => Ok(SlashCommand::Filters { url: url()? }),
        other => Err(InputError::UnknownCommand(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://example.com/team.ics";

    fn opts(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defines_every_command() {
        assert_eq!(definitions().len(), 6);
    }

    #[test]
    fn subscribe_without_filter() {
        let cmd = parse(SUBSCRIBE, &opts(&[("url", URL)])).unwrap();
        assert_eq!(
            cmd,
            SlashCommand::Subscribe {
                url: URL.to_string(),
                filter: None
            }
        );
        assert_eq!(cmd.url(), URL);
    }

    #[test]
    fn subscribe_with_filter() {
        let cmd = parse(
            SUBSCRIBE,
            &opts(&[("url", URL), ("field", "name"), ("pattern", "Standup")]),
        )
        .unwrap();
        assert_eq!(
            cmd,
            SlashCommand::Subscribe {
                url: URL.to_string(),
                filter: Some(("name".to_string(), "Standup".to_string()))
            }
        );
    }

    #[test]
    fn subscribe_needs_both_filter_options() {
        let err = parse(SUBSCRIBE, &opts(&[("url", URL), ("field", "name")])).unwrap_err();
        assert_eq!(err.to_string(), "missing filter option `pattern`");

        let err = parse(SUBSCRIBE, &opts(&[("url", URL), ("pattern", "x")])).unwrap_err();
        assert_eq!(err.to_string(), "missing filter option `field`");
    }

    #[test]
    fn url_is_required() {
        assert_eq!(
            parse(UNSUBSCRIBE, &opts(&[])).unwrap_err(),
            InputError::MissingUrl
        );
        assert_eq!(
            parse(EVENTS, &opts(&[("url", "   ")])).unwrap_err(),
            InputError::MissingUrl
        );
    }

    #[test]
    fn filter_and_unfilter_require_all_options() {
        let cmd = parse(
            FILTER,
            &opts(&[("url", URL), ("field", "location"), ("pattern", "Room A")]),
        )
        .unwrap();
        assert!(matches!(cmd, SlashCommand::Filter { ref pattern, .. } if pattern == "Room A"));

        let err = parse(UNFILTER, &opts(&[("url", URL), ("field", "name")])).unwrap_err();
        assert_eq!(err, InputError::MissingOption("pattern"));
    }

    #[test]
    fn unknown_command() {
        let err = parse("remind", &opts(&[("url", URL)])).unwrap_err();
        assert_eq!(err, InputError::UnknownCommand("remind".to_string()));
    }
}
