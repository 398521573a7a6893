use std::fs;
use std::path::{
    Path,
    PathBuf,
};

use clap::{
    Parser,
    Subcommand,
};
use offtime_eeprom_tool::{
    parse_selector,
    EepromImage,
    Selector,
};

#[derive(Parser)]
#[command(name = "offtime-eeprom-tool")]
#[command(about = "offtime-driver EEPROM image generator and parser", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a mode ring image holding a single committed cell
    Generate {
        /// Mode name, table index or shortcut slot (e.g. `high`, `3`, `shortcut:0`)
        #[arg(short, long, value_parser = selector_arg, default_value = "moon")]
        mode: Selector,

        /// Ring cell to commit the mode in (0-31)
        #[arg(short, long, default_value_t = 0)]
        position: usize,

        /// Write a hex dump instead of raw bytes
        #[arg(long)]
        hex: bool,

        /// Output file path
        output: PathBuf,
    },
    /// Decode a mode ring image the way the driver does at boot
    Parse {
        /// Input file path
        input: PathBuf,

        /// The input is a hex dump instead of raw bytes
        #[arg(long)]
        hex: bool,
    },
    /// Dump every cell of a mode ring image to a CSV file
    Dump {
        /// Input file path
        input: PathBuf,

        /// Output CSV file path
        output: PathBuf,

        /// The input is a hex dump instead of raw bytes
        #[arg(long)]
        hex: bool,
    },
}

fn selector_arg(s: &str) -> Result<Selector, String> {
    parse_selector(s).map_err(|e| e.to_string())
}

fn read_image(input: &Path, hex: bool) -> Result<EepromImage, Box<dyn std::error::Error>> {
    println!("Reading image: {}", input.display());
    let image = if hex {
        EepromImage::from_hex(&fs::read_to_string(input)?)?
    } else {
        EepromImage::from_file(input)?
    };
    Ok(image)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            mode,
            position,
            hex,
            output,
        } => {
            let image = EepromImage::generate(mode, position)?;
            if hex {
                fs::write(&output, image.to_hex() + "\n")?;
            } else {
                image.write_file(&output)?;
            }

            println!("Successfully generated mode image: {}", output.display());
            print!("{}", image.parse());

            Ok(())
        }
        Commands::Parse { input, hex } => {
            let image = read_image(&input, hex)?;
            println!("{}", image.to_hex());
            print!("{}", image.parse());

            Ok(())
        }
        Commands::Dump { input, output, hex } => {
            let image = read_image(&input, hex)?;

            println!("Writing CSV file...");
            image.to_csv_file(&output)?;

            println!("Successfully dumped mode image to: {}", output.display());

            Ok(())
        }
    }
}
