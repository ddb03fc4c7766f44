//! Numbers printed by a user-supplied command.

use tracing::debug;

use crate::caption::{Caption, CaptionComponent};
use crate::dataset::{Dataset, DatasetMode};

use super::{
    ConfigValue, Provider, ProviderConfig, ProviderDescriptor, ProviderError, SamplingContext,
};

const MAX_VALUES: usize = 4;

pub(super) const DESCRIPTOR: ProviderDescriptor = ProviderDescriptor {
    name: "parm",
    label: "Parametric",
    description: "Shows up to four numbers printed by a custom command.",
    help: "The command runs through `sh -c` once per tick. The first four numbers \
           found in its standard output are plotted; missing ones are drawn as zero.",
    hue: 270,
    n: MAX_VALUES,
    series: &["Value 1", "Value 2", "Value 3", "Value 4"],
    mode: DatasetMode::Absolute,
    init,
};

#[derive(Default)]
struct ParmProvider {
    command: String,
    found: usize,
    first_line: String,
}

fn init(config: &mut ProviderConfig) -> Result<Box<dyn Provider>, ProviderError> {
    config.add_entry(
        "command",
        "Command",
        "Command line whose output is parsed for numbers.",
        ConfigValue::Text(String::new()),
    )?;
    Ok(Box::new(ParmProvider::default()))
}

/// Extracts up to [`MAX_VALUES`] non-negative numbers from command output.
/// Tokens that are not numbers are skipped; negatives count as zero.
fn parse_numbers(output: &str) -> Vec<u64> {
    output
        .split(|c: char| c.is_whitespace() || c == ',' || c == ';')
        .filter_map(|token| token.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .map(|v| v.max(0.0).round() as u64)
        .take(MAX_VALUES)
        .collect()
}

impl Provider for ParmProvider {
    fn configure(&mut self, ctx: &mut SamplingContext<'_>) {
        self.command = ctx
            .config()
            .get_text("command")
            .unwrap_or_default()
            .trim()
            .to_string();
        ctx.set_need_data_reset();
    }

    fn sample(&mut self, ctx: &mut SamplingContext<'_>) -> Result<(), ProviderError> {
        if self.command.is_empty() {
            return Err(ProviderError::Configuration(
                "No command configured".to_string(),
            ));
        }

        let output = ctx
            .sources()
            .commands
            .run(&self.command)
            .map_err(|e| ProviderError::Collect(format!("cannot run '{}': {}", self.command, e)))?;
        if !output.success {
            let reason = output.stderr.lines().next().unwrap_or("").trim();
            return Err(ProviderError::DataUnavailable(format!(
                "Command '{}' failed{}{}",
                self.command,
                if reason.is_empty() { "" } else { ": " },
                reason
            )));
        }

        let values = parse_numbers(&output.stdout);
        if values.is_empty() {
            return Err(ProviderError::DataUnavailable(format!(
                "Command '{}' printed no numbers",
                self.command
            )));
        }
        debug!(command = %self.command, ?values, "parsed command output");

        for i in 0..MAX_VALUES {
            ctx.set_data(i, values.get(i).copied().unwrap_or(0));
        }
        ctx.set_max(1);

        self.found = values.len();
        self.first_line = output.stdout.lines().next().unwrap_or("").trim().to_string();
        Ok(())
    }

    fn footprint(&self) -> usize {
        std::mem::size_of::<Self>() + self.command.capacity() + self.first_line.capacity()
    }

    fn caption(&self, caption: &mut Caption, dataset: &Dataset) {
        caption.set(CaptionComponent::Title, format_args!("{}", self.command));
        for i in 0..self.found.min(MAX_VALUES) {
            caption.body_line(format_args!("Value {}: {}", i + 1, dataset.latest(i)));
        }
        caption.set(CaptionComponent::Footer, format_args!("Output: {}", self.first_line));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::{MockCommands, MockFs};
    use crate::provider::testing::Harness;

    #[test]
    fn test_parse_numbers() {
        assert_eq!(parse_numbers("12 7.6 abc -3\n9 10"), vec![12, 8, 0, 9]);
        assert_eq!(parse_numbers("load=1 2,3;4"), vec![2, 3, 4]);
        assert!(parse_numbers("nothing here").is_empty());
        assert!(parse_numbers("inf NaN").is_empty());
    }

    #[test]
    fn test_runs_command() {
        let mut h = Harness::new("parm", MockFs::new());
        h.commands = MockCommands::new().with_stdout("echo 5 10", "5 10\n");
        h.set("command", "echo 5 10");

        let tick = h.tick().unwrap();
        assert_eq!(tick.values, [5, 10, 0, 0]);
        assert_eq!(tick.ceiling, 1);
        assert_eq!(h.commands.calls(), vec!["echo 5 10".to_string()]);

        let caption = h.caption();
        assert_eq!(caption.get(CaptionComponent::Title), "echo 5 10");
        assert_eq!(caption.get(CaptionComponent::Body), "Value 1: 5\nValue 2: 10");
        assert_eq!(caption.get(CaptionComponent::Footer), "Output: 5 10");
    }

    #[test]
    fn test_unconfigured_command() {
        let mut h = Harness::new("parm", MockFs::new());
        assert!(matches!(h.tick(), Err(ProviderError::Configuration(_))));
    }

    #[test]
    fn test_failing_command() {
        let mut h = Harness::new("parm", MockFs::new());
        h.commands = MockCommands::new().with_failure("false", "permission denied\n");
        h.set("command", "false");
        assert_eq!(
            h.tick().unwrap_err(),
            ProviderError::DataUnavailable("Command 'false' failed: permission denied".into())
        );
    }

    #[test]
    fn test_unknown_command_is_collect_error() {
        let mut h = Harness::new("parm", MockFs::new());
        h.set("command", "does-not-exist");
        assert!(matches!(h.tick(), Err(ProviderError::Collect(_))));
    }

    #[test]
    fn test_output_without_numbers() {
        let mut h = Harness::new("parm", MockFs::new());
        h.commands = MockCommands::new().with_stdout("date", "Mon Oct\n");
        h.set("command", "date");
        assert!(matches!(h.tick(), Err(ProviderError::DataUnavailable(_))));
    }
}
