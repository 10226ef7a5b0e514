use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use estatecache_core::models::PropertyTraceInput;

#[derive(Parser)]
#[command(
    name = "estatecache",
    about = "Back-office client for owners, properties, images and sale history",
    version,
    long_about = None
)]
pub struct Cli {
    /// API base URL (overrides ESTATECACHE_API_URL and the config file)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Also write logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage property owners
    #[command(subcommand)]
    Owners(OwnerCommand),

    /// Manage properties
    #[command(subcommand)]
    Properties(PropertyCommand),

    /// Manage property images
    #[command(subcommand)]
    Images(ImageCommand),

    /// Manage sale and valuation history
    #[command(subcommand)]
    Traces(TraceCommand),

    /// Show owner and property counts
    Stats,

    /// Search properties interactively, one filter line per input line
    /// (`name=..;address=..;min=..;max=..`, or `refresh`)
    Search {
        /// Filters applied before the first line is read
        #[arg(default_value = "")]
        initial: String,
    },

    /// Show or change the saved configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand)]
pub enum OwnerCommand {
    List,
    Show {
        id: String,
        /// Include the owner's properties
        #[arg(long)]
        with_properties: bool,
    },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        address: String,
        /// Birth date, YYYY-MM-DD
        #[arg(long)]
        birthday: String,
        /// Photo URL
        #[arg(long)]
        photo: Option<String>,
    },
    Update {
        id: String,
        #[command(flatten)]
        fields: OwnerFields,
    },
    Delete {
        id: String,
    },
    /// Upload a photo file for an owner
    UploadPhoto {
        id: String,
        file: PathBuf,
    },
}

#[derive(Args)]
pub struct OwnerFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub birthday: Option<String>,
    #[arg(long)]
    pub photo: Option<String>,
}

#[derive(Args, Default)]
pub struct FilterArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub min_price: Option<f64>,
    #[arg(long)]
    pub max_price: Option<f64>,
}

#[derive(Subcommand)]
pub enum PropertyCommand {
    List {
        #[command(flatten)]
        filters: FilterArgs,
    },
    Show {
        id: String,
    },
    /// Create a property, optionally with images and sale history
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        address: String,
        #[arg(long)]
        price: f64,
        /// Internal code
        #[arg(long)]
        code: String,
        #[arg(long)]
        year: i32,
        /// Owner id
        #[arg(long)]
        owner: String,
        /// Image file to upload; the first one becomes the primary image
        #[arg(long = "image")]
        images: Vec<PathBuf>,
        /// Sale record as NAME:VALUE:TAX:DATE
        #[arg(long = "trace", value_parser = parse_trace)]
        traces: Vec<PropertyTraceInput>,
    },
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        code: Option<String>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        owner: Option<String>,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand)]
pub enum ImageCommand {
    List {
        /// Only images of this property
        #[arg(long)]
        property: Option<String>,
    },
    Upload {
        property_id: String,
        file: PathBuf,
        /// Upload without showing the image
        #[arg(long)]
        disabled: bool,
    },
    /// Replace the file behind an existing image
    Replace {
        id: String,
        file: PathBuf,
        #[arg(long)]
        disabled: bool,
    },
    /// Enable or disable an image
    Toggle {
        id: String,
        #[arg(long, action = ArgAction::Set)]
        enabled: bool,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand)]
pub enum TraceCommand {
    List {
        /// Only traces of this property
        #[arg(long)]
        property: Option<String>,
    },
    Create {
        /// Property id
        #[arg(long)]
        property: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        value: f64,
        #[arg(long, default_value_t = 0.0)]
        tax: f64,
        /// Sale date, YYYY-MM-DD
        #[arg(long)]
        date: String,
    },
    Delete {
        id: String,
    },
    /// Sum of taxes and sale values for a property
    Totals {
        property_id: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    Show,
    SetUrl {
        url: String,
    },
}

/// Parse `NAME:VALUE:TAX:DATE`. The name may itself contain colons.
pub fn parse_trace(s: &str) -> Result<PropertyTraceInput, String> {
    let mut fields = s.rsplitn(4, ':');
    let (Some(date), Some(tax), Some(value), Some(name)) = (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err("expected NAME:VALUE:TAX:DATE".to_string());
    };
    let value: f64 = value.trim().parse().map_err(|_| format!("invalid value {:?}", value))?;
    let tax: f64 = tax.trim().parse().map_err(|_| format!("invalid tax {:?}", tax))?;
    Ok(PropertyTraceInput {
        date_sale: date.trim().to_string(),
        value,
        tax,
        name: Some(name.trim().to_string()),
        id_property: None,
    })
}
