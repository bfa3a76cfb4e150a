//! Built-in demo grammar for the `cmdargs` binary
//!
//! A small key/value store command set:
//!
//! ```text
//! set [-f|--force] [-t|--ttl <seconds>] <key> <value...>
//! get <key>
//! list [limit] [asc|desc]
//! del <key>...
//! ```

use crate::config::ParserConfig;
use crate::parser::ArgumentParser;
use crate::parser::elements::{
    Element, Flags, all_of, choices, first_parsing, integer, literal, optional,
    optional_weak_with_default, remaining_joined_strings, seq, string,
};

/// Usage text printed by `help` in the REPL
pub const USAGE: &str = "\
set [-f|--force] [-t|--ttl <seconds>] <key> <value...>
get <key>
list [limit] [asc|desc]
del <key>...";

/// Default number of entries for `list`
const DEFAULT_LIST_LIMIT: i32 = 10;

/// Build the demo grammar, taking unknown-flag policies from `config`
pub fn demo_grammar(config: &ParserConfig) -> Element {
    let set = seq([
        literal("set", &["set"]),
        Flags::builder()
            .flag(&["f", "-force"])
            .value_flag(integer("ttl"), &["t", "-ttl"])
            .unknown_short_flags(config.unknown_short_flags)
            .unknown_long_flags(config.unknown_long_flags)
            .build_with(seq([string("key"), remaining_joined_strings("value")])),
    ]);

    let get = seq([literal("get", &["get"]), string("key")]);

    let list = seq([
        literal("list", &["list"]),
        optional_weak_with_default(integer("limit"), DEFAULT_LIST_LIMIT),
        optional(choices("order", [("asc", "asc"), ("desc", "desc")])),
    ]);

    let del = seq([literal("del", &["del"]), all_of(string("keys"))]);

    first_parsing([set, get, list, del])
}

/// Demo grammar bound to the configured tokenizer
pub fn demo_parser(config: &ParserConfig) -> ArgumentParser {
    ArgumentParser::new(demo_grammar(config)).with_tokenizer(config.tokenizer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Tokenizer;
    use crate::parser::elements::UnknownFlagPolicy;

    fn parser() -> ArgumentParser {
        demo_parser(&ParserConfig::default())
    }

    #[test]
    fn test_set_with_flags() {
        let ctx = parser().parse("set -ft 30 greeting \"hello there\" friend").unwrap();
        assert!(ctx.get_one::<bool>("f").unwrap());
        assert_eq!(ctx.get_one::<i32>("ttl").unwrap(), 30);
        assert_eq!(ctx.get_one::<String>("key").unwrap(), "greeting");
        assert_eq!(ctx.get_one::<String>("value").unwrap(), "hello there friend");
    }

    #[test]
    fn test_unknown_flag_follows_config() {
        assert!(parser().parse("set --owner ops k v").is_err());

        let config = ParserConfig {
            unknown_long_flags: UnknownFlagPolicy::AcceptValue,
            ..ParserConfig::default()
        };
        let ctx = demo_parser(&config).parse("set --owner ops k v").unwrap();
        assert_eq!(ctx.get_one::<String>("owner").unwrap(), "ops");
        assert_eq!(ctx.get_one::<String>("key").unwrap(), "k");
    }

    #[test]
    fn test_list_defaults_and_order() {
        let ctx = parser().parse("list desc").unwrap();
        assert_eq!(ctx.get_one::<i32>("limit").unwrap(), DEFAULT_LIST_LIMIT);
        assert_eq!(ctx.get_one::<String>("order").unwrap(), "desc");

        let ctx = parser().parse("list 5").unwrap();
        assert_eq!(ctx.get_one::<i32>("limit").unwrap(), 5);
        assert!(!ctx.has_any("order"));
    }

    #[test]
    fn test_del_collects_keys() {
        let ctx = parser().parse("del a b c").unwrap();
        let keys: Vec<String> = ctx.get_all("keys");
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_tokenizer_from_config() {
        let config = ParserConfig {
            tokenizer: Tokenizer::SpaceSplit,
            ..ParserConfig::default()
        };
        let ctx = demo_parser(&config).parse("get \"quoted\"").unwrap();
        assert_eq!(ctx.get_one::<String>("key").unwrap(), "\"quoted\"");
    }

    #[test]
    fn test_completion() {
        assert_eq!(parser().complete(""), vec!["set", "get", "list", "del"]);
        assert_eq!(parser().complete("list 5 "), vec!["asc", "desc"]);
        assert_eq!(parser().complete("set --f"), vec!["--force"]);
    }
}
