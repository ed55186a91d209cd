//! Resolution integration tests
//!
//! Exercises the full pipeline: location matching, longest-title command
//! matching, dynamic expansion and action rendering.

use launchpad::command::{ActionTemplate, Resolution, Resolver, ScriptedRunner};
use launchpad::core::ResolverConfig;
use launchpad::model::{Command, CommandKind, Location, ValueSource};
use proptest::prelude::*;

fn titles(resolution: &Resolution<'_>) -> Vec<String> {
    resolution.commands().map(|c| c.title.clone()).collect()
}

fn git_commands() -> Vec<Command> {
    vec![
        Command::new("commit", "git commit -m '[input_raw]'").with_kind(CommandKind::NeedsParameter),
        Command::new("add all & commit", "git add -A && git commit -m '[input_raw]'")
            .with_kind(CommandKind::NeedsParameter),
        Command::new("checkout", "git checkout [input]").with_kind(CommandKind::NeedsSelection(
            ValueSource::Command("git branch --format='%(refname:short)'".into()),
        )),
        Command::new("push", "git push origin [input]")
            .with_secondary_action("git branch --show-current"),
        Command::new("subcommands", "").with_subcommands(vec![Command::new("level 2", "")
            .with_subcommands(vec![Command::new("level 3", "echo [title] [parent] [parent:2]")])]),
    ]
}

fn git_runner() -> ScriptedRunner {
    ScriptedRunner::new()
        .with_output("git branch --format='%(refname:short)'", "main\ndev\nfeature/login\n")
        .with_output("git branch --show-current", "dev\n")
}

#[test]
fn test_longest_title_precedence() {
    let config = ResolverConfig::default();
    let runner = git_runner();
    let locations = vec![Location::new("timer", "/repo")];
    let commands = git_commands();

    let resolution =
        Resolver::new(&config, &runner).resolve("timer add all & commit hi", &locations, &commands);

    assert_eq!(titles(&resolution), vec!["add all & commit"]);
    assert_eq!(resolution.unfinished_query(), "hi");
}

#[test]
fn test_nested_resolution() {
    let config = ResolverConfig::default();
    let runner = git_runner();
    let locations = vec![Location::new("timer", "/repo")];
    let commands = git_commands();

    let resolution = Resolver::new(&config, &runner).resolve(
        "timer subcommands level 2 level",
        &locations,
        &commands,
    );

    assert_eq!(titles(&resolution), vec!["subcommands", "level 2"]);
    assert_eq!(resolution.unfinished_query(), "level");
}

#[test]
fn test_dynamic_expansion_checkout() {
    let config = ResolverConfig::default();
    let runner = git_runner();
    let locations = vec![Location::new("timer", "/repo")];
    let commands = git_commands();

    let resolution =
        Resolver::new(&config, &runner).resolve("timer checkout main", &locations, &commands);

    assert_eq!(titles(&resolution), vec!["checkout", "main"]);
    let last = resolution.last().unwrap();
    assert!(resolution.arena().node(last).is_ephemeral());

    let engine = ActionTemplate::new(&config, &runner);
    let command = resolution.last_command().unwrap();
    let rendered = engine.render(&command.action, None, None, &resolution.context_for(last));
    assert_eq!(rendered.text, "git checkout main");
    assert_eq!(rendered.full_command, "cd '/repo'; git checkout main");
    assert!(rendered.satisfied);
}

#[test]
fn test_selection_candidates_listed_while_typing() {
    let config = ResolverConfig::default();
    let runner = git_runner();
    let locations = vec![Location::new("timer", "/repo")];
    let commands = git_commands();

    let resolution =
        Resolver::new(&config, &runner).resolve("timer checkout feat", &locations, &commands);

    assert_eq!(titles(&resolution), vec!["checkout"]);
    assert_eq!(resolution.unfinished_query(), "feat");
    let candidates: Vec<&str> = resolution
        .candidates()
        .iter()
        .map(|&id| resolution.arena().title(id))
        .collect();
    assert_eq!(candidates, vec!["main", "dev", "feature/login"]);
}

#[test]
fn test_template_under_nested_chain() {
    let config = ResolverConfig::default();
    let runner = git_runner();
    let locations = vec![Location::new("timer", "/repo")];
    let commands = git_commands();

    let resolution = Resolver::new(&config, &runner).resolve(
        "timer subcommands level 2 level 3",
        &locations,
        &commands,
    );
    let last = resolution.last().unwrap();
    let command = resolution.last_command().unwrap();

    let rendered = ActionTemplate::new(&config, &runner).render(
        &command.action,
        None,
        None,
        &resolution.context_for(last),
    );
    assert_eq!(rendered.text, "echo level 3 level 2 subcommands");
}

#[test]
fn test_secondary_action_for_push() {
    let config = ResolverConfig::default();
    let runner = git_runner();
    let locations = vec![Location::new("timer", "/repo")];
    let commands = git_commands();

    let resolution = Resolver::new(&config, &runner).resolve("timer push", &locations, &commands);
    let last = resolution.last().unwrap();
    let command = resolution.last_command().unwrap();

    let rendered = ActionTemplate::new(&config, &runner).render(
        &command.action,
        None,
        command.secondary_action.as_deref(),
        &resolution.context_for(last),
    );
    assert_eq!(rendered.full_command, "cd '/repo'; git push origin dev");
}

#[test]
fn test_multi_word_locations() {
    let config = ResolverConfig::default();
    let runner = git_runner();
    let locations = vec![Location::new("timer", "/a"), Location::new("timer test", "/b")];
    let commands = git_commands();

    let resolution = Resolver::new(&config, &runner).resolve(
        "timer test subcommands level 2 s",
        &locations,
        &commands,
    );

    assert_eq!(resolution.location().unwrap().title, "timer test");
    assert_eq!(titles(&resolution), vec!["subcommands", "level 2"]);
    assert_eq!(resolution.unfinished_query(), "s");
}

#[test]
fn test_inline_siblings_match_directly() {
    let config = ResolverConfig::default();
    let runner = ScriptedRunner::new().with_output("git branch", "main\ndev\n");
    let locations = vec![Location::new("timer", "/repo")];
    let commands = vec![Command::new("git", "").with_subcommands(vec![
        Command::new("status", "git status"),
        Command::new("branches", "git checkout [input]")
            .with_kind(CommandKind::NeedsSelection(ValueSource::Command("git branch".into())))
            .inline(),
    ])];

    let resolution = Resolver::new(&config, &runner).resolve("timer git dev", &locations, &commands);

    assert_eq!(titles(&resolution), vec!["git", "dev"]);
    assert_eq!(resolution.last_command().unwrap().action, "git checkout dev");
}

prop_compose! {
    fn title_strategy()(title in "[a-z]{3,8}( [a-z]{2,6})?") -> String {
        title
    }
}

proptest! {
    #[test]
    fn prop_exact_location_and_command(
        loc_title in title_strategy(),
        cmd_title in title_strategy(),
        other in title_strategy(),
    ) {
        prop_assume!(!loc_title.starts_with(&other) && !other.starts_with(&loc_title));
        prop_assume!(!cmd_title.starts_with(&other) && !other.starts_with(&cmd_title));

        let config = ResolverConfig::default();
        let runner = ScriptedRunner::new();
        let locations = vec![Location::new(loc_title.clone(), "/x"), Location::new(other.clone(), "/y")];
        let commands = vec![Command::new(cmd_title.clone(), "run"), Command::new(other.clone(), "other")];

        let query = format!("{} {}", loc_title, cmd_title);
        let resolution = Resolver::new(&config, &runner).resolve(&query, &locations, &commands);

        prop_assert_eq!(&resolution.location().unwrap().title, &loc_title);
        prop_assert_eq!(titles(&resolution), vec![cmd_title]);
        prop_assert_eq!(resolution.unfinished_query(), "");
    }

    #[test]
    fn prop_resolution_is_deterministic(query in "[a-z &]{0,30}") {
        let config = ResolverConfig::default();
        let runner = git_runner();
        let locations = vec![Location::new("timer", "/a"), Location::new("timer test", "/b")];
        let commands = git_commands();
        let resolver = Resolver::new(&config, &runner);

        let first = resolver.resolve(&format!("timer {}", query), &locations, &commands);
        let second = resolver.resolve(&format!("timer {}", query), &locations, &commands);

        prop_assert_eq!(first.location().map(|l| &l.title), second.location().map(|l| &l.title));
        prop_assert_eq!(titles(&first), titles(&second));
        prop_assert_eq!(first.unfinished_query(), second.unfinished_query());
    }
}
