use colored::Colorize;

use brainflow::{BoardIds, BoardShim, BrainFlowError, ChannelKind, ExitCode};

use super::CliError;

pub fn run(board_arg: &str) -> Result<(), CliError> {
    let board_id: i32 = board_arg
        .parse()
        .map_err(|_| CliError::Usage(format!("Invalid board id: {}", board_arg)))?;

    let name = BoardIds::try_from(board_id)
        .map(|id| format!("{:?}", id))
        .unwrap_or_else(|_| "unknown board".to_string());
    println!("{}", format!("Board {} ({})", board_id, name).bold());

    println!("  sampling rate:  {} Hz", BoardShim::get_sampling_rate(board_id)?);
    println!("  rows:           {}", BoardShim::get_num_rows(board_id)?);
    println!("  package row:    {}", BoardShim::get_package_num_channel(board_id)?);
    println!("  timestamp row:  {}", BoardShim::get_timestamp_channel(board_id)?);

    for kind in ChannelKind::ALL {
        let label = format!("{}:", kind.label());
        match BoardShim::get_channels(board_id, kind) {
            Ok(channels) if !channels.is_empty() => println!("  {:<15} {:?}", label, channels),
            // boards without rows of this kind report missing json data
            Ok(_) | Err(BrainFlowError::Exit(ExitCode::NoSuchDataInJsonError)) => {
                println!("  {:<15} {}", label, "-".dimmed())
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}
