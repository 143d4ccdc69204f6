/// Available commands (screens) and autocomplete logic

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  /// Single-key shortcut shown in the nav bar ("" for none)
  pub key: &'static str,
  pub description: &'static str,
}

/// All available commands, in nav bar order
pub const COMMANDS: &[Command] = &[
  Command {
    name: "home",
    aliases: &["h", "add", "mutation"],
    key: "1",
    description: "Add a product (mutation)",
  },
  Command {
    name: "regular",
    aliases: &["r", "fetch"],
    key: "2",
    description: "Plain fetch on open, no query cache",
  },
  Command {
    name: "query",
    aliases: &["qf", "usequery"],
    key: "3",
    description: "Cached query, press l to load",
  },
  Command {
    name: "pagination",
    aliases: &["p", "pages"],
    key: "4",
    description: "Numbered pages",
  },
  Command {
    name: "infinite",
    aliases: &["i", "more", "button"],
    key: "5",
    description: "Infinite list with a Load More key",
  },
  Command {
    name: "auto",
    aliases: &["a", "infinite-auto", "scroll"],
    key: "6",
    description: "Infinite list that loads on scroll",
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    key: "",
    description: "Exit qfetch",
  },
];

/// Exact lookup by name or alias
pub fn find(input: &str) -> Option<&'static Command> {
  let input = input.trim().to_lowercase();
  COMMANDS
    .iter()
    .find(|cmd| cmd.name == input || cmd.aliases.contains(&input.as_str()))
}

/// Lookup by single-key shortcut
pub fn by_key(key: char) -> Option<&'static Command> {
  let mut buf = [0u8; 4];
  let key = key.encode_utf8(&mut buf);
  COMMANDS.iter().find(|cmd| !cmd.key.is_empty() && cmd.key == key)
}

/// Get autocomplete suggestions for a given input
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let input_lower = input.trim().to_lowercase();

  if input_lower.is_empty() {
    return COMMANDS.iter().collect();
  }

  let mut matches: Vec<(&Command, u32)> = Vec::new();

  for cmd in COMMANDS {
    let priority = if cmd.name == input_lower {
      0
    } else if cmd.aliases.contains(&input_lower.as_str()) {
      1
    } else if cmd.name.starts_with(&input_lower) {
      2
    } else if cmd.aliases.iter().any(|a| a.starts_with(&input_lower)) {
      3
    } else if cmd.name.contains(&input_lower) {
      4
    } else if cmd.aliases.iter().any(|a| a.contains(&input_lower)) {
      5
    } else {
      continue;
    };
    matches.push((cmd, priority));
  }

  // Stable sort keeps nav order within a priority
  matches.sort_by_key(|(_, priority)| *priority);

  matches.into_iter().map(|(cmd, _)| cmd).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_input_returns_all() {
    let suggestions = get_suggestions("");
    assert_eq!(suggestions.len(), COMMANDS.len());
  }

  #[test]
  fn test_exact_match() {
    let suggestions = get_suggestions("auto");
    assert_eq!(suggestions[0].name, "auto");
  }

  #[test]
  fn test_alias_match() {
    let suggestions = get_suggestions("q");
    assert_eq!(suggestions[0].name, "quit");
  }

  #[test]
  fn test_prefix_match() {
    let suggestions = get_suggestions("pag");
    assert_eq!(suggestions[0].name, "pagination");
  }

  #[test]
  fn test_fuzzy_match() {
    let suggestions = get_suggestions("gul");
    assert_eq!(suggestions[0].name, "regular");
  }

  #[test]
  fn test_find_and_by_key() {
    assert_eq!(find(" Scroll ").map(|c| c.name), Some("auto"));
    assert_eq!(find("nothing"), None);
    assert_eq!(by_key('4').map(|c| c.name), Some("pagination"));
    assert_eq!(by_key('9'), None);
  }
}
