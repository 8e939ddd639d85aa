/// Console commands.
#[derive(Debug, PartialEq)]
pub enum Command {
    /// Start a race with every car in the garage.
    ///
    /// Usage: `race`
    Race,

    /// Stop the current race, and return to idle.
    ///
    /// Usage: `reset`
    Reset,

    /// Remove a car from the garage and the leaderboard.
    ///
    /// Usage: `remove <id>`
    Remove { car_id: i32 },

    /// Add a car to the garage.
    ///
    /// Usage: `create <color> <name>`
    Create { name: String, color: String },

    /// Change a car's name and color.
    ///
    /// Usage: `update <id> <color> <name>`
    Update {
        car_id: i32,
        name: String,
        color: String,
    },

    /// Add a batch of random cars to the garage.
    ///
    /// Usage: `generate`
    Generate,

    /// List the cars in the race, with their assigned times.
    ///
    /// Usage: `garage [page]`
    Garage { page_idx: usize },

    /// List the leaderboard.
    ///
    /// Usage: `winners [page]`
    Winners { page_idx: usize },

    /// Print a reference of available commands.
    ///
    /// Usage: `help`
    Help,

    /// Exit the program.
    ///
    /// Usage: `quit`
    Quit,
}

impl Command {
    /// Parse a command. Page numbers are one-based.
    pub fn from(line: &str) -> Option<Command> {
        use Command::*;

        let parts: Vec<&str> = line.split_whitespace().collect();

        match &parts[..] {
            ["race"] => Some(Race),
            ["reset"] => Some(Reset),
            ["remove", id] => id.parse().ok().map(|car_id| Remove { car_id }),
            ["create", color, name @ ..] if is_color(color) && !name.is_empty() => Some(Create {
                name: name.join(" "),
                color: color.to_string(),
            }),
            ["update", id, color, name @ ..] if is_color(color) && !name.is_empty() => {
                id.parse().ok().map(|car_id| Update {
                    car_id,
                    name: name.join(" "),
                    color: color.to_string(),
                })
            }
            ["generate"] => Some(Generate),
            ["garage"] => Some(Garage { page_idx: 0 }),
            ["garage", page] => page_idx(page).map(|page_idx| Garage { page_idx }),
            ["winners"] => Some(Winners { page_idx: 0 }),
            ["winners", page] => page_idx(page).map(|page_idx| Winners { page_idx }),
            ["help"] => Some(Help),
            ["quit"] | ["exit"] => Some(Quit),
            _ => None,
        }
    }
}

fn page_idx(page: &str) -> Option<usize> {
    page.parse::<usize>().ok().and_then(|page| page.checked_sub(1))
}

/// `True` for hex colors like `#1a2b3c`.
fn is_color(s: &str) -> bool {
    s.len() == 7 && s.starts_with('#') && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Command reference that can be printed on the console.
pub const COMMAND_REFERENCE: &str = "
race                           Start a race.
reset                          Stop the race and return to the garage.
remove <id>                    Remove a car.
create <color> <name>          Add a car, f.e. 'create #ff0000 Audi R8'.
update <id> <color> <name>     Change a car's name and color.
generate                       Add a batch of random cars.
garage [page]                  List cars in the race.
winners [page]                 List the leaderboard.
help                           Display this list.
quit                           Exit.
";
