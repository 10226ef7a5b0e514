//! Command handlers. Each one talks to the API through a shared
//! `EstateService` and prints its result.

use anyhow::{Context, Result};
use estatecache_core::filters::{FilterPipeline, PropertyFilters};
use estatecache_core::models::{OwnerInput, PropertyImage, PropertyInput, PropertyTrace, PropertyTraceInput};
use estatecache_core::utils::format_price;
use estatecache_core::{ApiClient, Config, EstateService, Upload};
use futures::future::try_join_all;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use crate::cli::{
    Cli, Commands, ConfigCommand, FilterArgs, ImageCommand, OwnerCommand, PropertyCommand, TraceCommand,
};
use crate::output;

type Service = EstateService<ApiClient>;

pub async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load().context("Failed to load configuration")?;

    if let Commands::Config(command) = cli.command {
        return config_command(command, config);
    }

    if let Some(url) = cli.api_url {
        config.api_url = Some(url);
    }
    let service = connect(&config)?;

    match cli.command {
        Commands::Owners(command) => owners(&service, command).await,
        Commands::Properties(command) => properties(&service, command).await,
        Commands::Images(command) => images(&service, command).await,
        Commands::Traces(command) => traces(&service, command).await,
        Commands::Stats => {
            output::print_stats(&service.stats().await?);
            Ok(())
        }
        Commands::Search { initial } => search(service, &initial, &config).await,
        Commands::Config(_) => Ok(()),
    }
}

fn connect(config: &Config) -> Result<Service> {
    let mut client = ApiClient::with_timeout(config.api_url(), config.request_timeout())
        .context("Failed to build HTTP client")?;
    if let Some(ref token) = config.token {
        client.set_token(token.clone());
    }
    info!(api_url = %config.api_url(), "Using API");
    Ok(EstateService::new(client))
}

fn config_command(command: ConfigCommand, mut config: Config) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            println!("config file:  {}", Config::config_path()?.display());
            println!("api url:      {}", config.api_url());
            println!("token:        {}", if config.token.is_some() { "set" } else { "not set" });
            println!("debounce:     {} ms", config.debounce().as_millis());
            println!("timeout:      {} s", config.request_timeout().as_secs());
        }
        ConfigCommand::SetUrl { url } => {
            // Persist only what the file held, not environment overrides
            let mut saved = Config::load_file()?;
            saved.api_url = Some(url.clone());
            saved.save()?;
            config.api_url = Some(url);
            println!("API url set to {}", config.api_url());
        }
    }
    Ok(())
}

async fn owners(service: &Service, command: OwnerCommand) -> Result<()> {
    match command {
        OwnerCommand::List => output::print_owners(&service.owners().await?),
        OwnerCommand::Show { id, with_properties } => {
            if with_properties {
                output::print_owner_with_properties(&service.owner_with_properties(&id).await?);
            } else {
                output::print_owner(&service.owner(&id).await?);
            }
        }
        OwnerCommand::Create {
            name,
            address,
            birthday,
            photo,
        } => {
            let input = OwnerInput {
                name: Some(name),
                address: Some(address),
                photo,
                birthday,
            };
            let owner = service.create_owner(&input).await?;
            println!("Owner created");
            output::print_owner(&owner);
        }
        OwnerCommand::Update { id, fields } => {
            let current = service.owner(&id).await?;
            let mut input = current.to_input();
            if let Some(name) = fields.name {
                input.name = Some(name);
            }
            if let Some(address) = fields.address {
                input.address = Some(address);
            }
            if let Some(birthday) = fields.birthday {
                input.birthday = birthday;
            }
            if let Some(photo) = fields.photo {
                input.photo = Some(photo);
            }
            service.update_owner(&id, &input).await?;
            println!("Owner updated");
        }
        OwnerCommand::Delete { id } => {
            service.delete_owner(&id).await?;
            println!("Owner deleted");
        }
        OwnerCommand::UploadPhoto { id, file } => {
            let upload = Upload::from_path(&file).await?;
            service.upload_owner_photo(&id, upload).await?;
            println!("Photo uploaded");
        }
    }
    Ok(())
}

impl From<FilterArgs> for PropertyFilters {
    fn from(args: FilterArgs) -> Self {
        PropertyFilters {
            name: args.name,
            address: args.address,
            min_price: args.min_price,
            max_price: args.max_price,
        }
    }
}

async fn properties(service: &Service, command: PropertyCommand) -> Result<()> {
    match command {
        PropertyCommand::List { filters } => {
            let filters = PropertyFilters::from(filters);
            output::print_properties(&service.properties(&filters).await?);
        }
        PropertyCommand::Show { id } => output::print_property(&service.property(&id).await?),
        PropertyCommand::Create {
            name,
            address,
            price,
            code,
            year,
            owner,
            images,
            traces,
        } => {
            let input = PropertyInput {
                name: Some(name),
                address: Some(address),
                price,
                code_internal: Some(code),
                year,
                id_owner: Some(owner),
            };
            let uploads = try_join_all(images.iter().map(|path| async move {
                Upload::from_path(path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))
            }))
            .await?;
            let summary = service.create_property_with_details(&input, uploads, traces).await?;
            println!("{} ({})", summary.message(), summary.property_id);
        }
        PropertyCommand::Update {
            id,
            name,
            address,
            price,
            code,
            year,
            owner,
        } => {
            let mut input = service.property(&id).await?.to_input();
            if let Some(name) = name {
                input.name = Some(name);
            }
            if let Some(address) = address {
                input.address = Some(address);
            }
            if let Some(price) = price {
                input.price = price;
            }
            if let Some(code) = code {
                input.code_internal = Some(code);
            }
            if let Some(year) = year {
                input.year = year;
            }
            if let Some(owner) = owner {
                input.id_owner = Some(owner);
            }
            service.update_property(&id, &input).await?;
            println!("Property updated");
        }
        PropertyCommand::Delete { id } => {
            service.delete_property(&id).await?;
            println!("Property deleted");
        }
    }
    Ok(())
}

async fn images(service: &Service, command: ImageCommand) -> Result<()> {
    match command {
        ImageCommand::List { property } => {
            let images: Vec<PropertyImage> = service
                .property_images()
                .await?
                .into_iter()
                .filter(|img| property.is_none() || img.id_property == property)
                .collect();
            output::print_images(&images);
        }
        ImageCommand::Upload {
            property_id,
            file,
            disabled,
        } => {
            let upload = Upload::from_path(&file).await?;
            service.upload_property_image(&property_id, upload, !disabled).await?;
            println!("Image uploaded");
        }
        ImageCommand::Replace { id, file, disabled } => {
            let upload = Upload::from_path(&file).await?;
            service.replace_property_image_file(&id, upload, !disabled).await?;
            println!("Image replaced");
        }
        ImageCommand::Toggle { id, enabled } => {
            service.set_image_enabled(&id, enabled).await?;
            println!("Image {}", if enabled { "enabled" } else { "disabled" });
        }
        ImageCommand::Delete { id } => {
            service.delete_property_image(&id).await?;
            println!("Image deleted");
        }
    }
    Ok(())
}

async fn traces(service: &Service, command: TraceCommand) -> Result<()> {
    match command {
        TraceCommand::List { property } => {
            let traces: Vec<PropertyTrace> = match property {
                Some(ref id) => service.traces_for_property(id).await?,
                None => service.property_traces().await?,
            };
            output::print_traces(&traces);
        }
        TraceCommand::Create {
            property,
            name,
            value,
            tax,
            date,
        } => {
            let input = PropertyTraceInput {
                date_sale: estatecache_core::utils::to_iso_timestamp(&date),
                value,
                tax,
                name: Some(name),
                id_property: Some(property),
            };
            service.create_property_trace(&input).await?;
            println!("Trace created");
        }
        TraceCommand::Delete { id } => {
            service.delete_property_trace(&id).await?;
            println!("Trace deleted");
        }
        TraceCommand::Totals { property_id } => {
            let (taxes, sales) = tokio::try_join!(
                service.total_taxes(&property_id),
                service.total_sales_value(&property_id)
            )?;
            println!("Total taxes: {}", format_price(taxes));
            println!("Total sales: {}", format_price(sales));
        }
    }
    Ok(())
}

/// Feed stdin lines into the debounced filter pipeline and print each settled result.
async fn search(service: Service, initial: &str, config: &Config) -> Result<()> {
    let initial: PropertyFilters = initial.parse().context("Invalid initial filters")?;
    let pipeline = FilterPipeline::spawn(service, initial, config.debounce());

    let mut states = pipeline.subscribe();
    let printer = tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let state = states.borrow_and_update().clone();
            if !state.loading {
                output::print_list_state(&state);
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.eq_ignore_ascii_case("refresh") {
            pipeline.refetch();
            continue;
        }
        match line.parse::<PropertyFilters>() {
            Ok(filters) => {
                debug!(filters = ?filters, "Filter edit");
                pipeline.set_filters(filters);
            }
            Err(e) => eprintln!("Ignoring line: {}", e),
        }
    }

    pipeline.close().await;
    let _ = printer.await;
    Ok(())
}
