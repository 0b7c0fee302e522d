use crate::cmd::ConfigArgs;
use crate::exit::{config_error, CliResult, SUCCESS};
use crate::output::{print_config, OutputFormat};

pub fn run(args: ConfigArgs, format: OutputFormat) -> CliResult<i32> {
    let config = args
        .line
        .settings(&args.port)
        .validate()
        .map_err(|err| config_error("invalid settings", err))?;
    print_config(&config, format);
    Ok(SUCCESS)
}
