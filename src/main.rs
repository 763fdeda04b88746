//! Vigil - 人员检测服务命令行客户端
//!
//! 两条流程:
//! - submit: 批量上传图片与共享元数据（BatchSubmitter）
//! - list / show: 分页浏览检测记录（QueryController）
//!
//! CLI 仅作为渲染层，不包含任何编排逻辑

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use vigil::application::commands::BatchSubmitter;
use vigil::application::ports::DetectionServicePort;
use vigil::application::queries::{QueryController, QueryOptions, SortField, SortOrder};
use vigil::config::{load_config, print_config};
use vigil::domain::submission::{FileItem, MetadataTemplate};
use vigil::infrastructure::adapters::{HttpDetectionClient, HttpDetectionClientConfig};
// use vigil::infrastructure::adapters::FakeDetectionClient;

#[derive(Parser)]
#[command(name = "vigil")]
#[command(about = "Batch image submission and browsing for a remote human detection service")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit images to the detection service
    Submit {
        /// Image files to submit (png, jpg, jpeg, gif)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Author name (required metadata)
        #[arg(short, long)]
        author: String,

        /// Author email
        #[arg(long)]
        email: Option<String>,

        /// Shared description for every file in the batch
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Browse detection records
    List {
        /// Search text (matched against title, author and description)
        #[arg(short, long)]
        search: Option<String>,

        /// Sort field: created_at | author_name | number_of_persons | status
        #[arg(long, default_value = "created_at")]
        sort: String,

        /// Sort order: asc | desc
        #[arg(long, default_value = "desc")]
        order: String,

        /// Page number (1-based)
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },

    /// Show a single detection record
    Show {
        /// Server-assigned record id
        id: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    let log_level = if cli.verbose {
        "debug"
    } else {
        config.log.level.as_str()
    };
    let log_filter = format!("{},vigil={}", log_level, log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter)),
        )
        .init();

    print_config(&config);

    // 创建 HTTP 检测客户端
    let client_config = HttpDetectionClientConfig {
        base_url: config.api.base_url.clone(),
        timeout_secs: config.api.timeout_secs,
    };
    let base_url = config.api.base_url.trim_end_matches('/').to_string();
    let service: Arc<dyn DetectionServicePort> = Arc::new(HttpDetectionClient::new(client_config)?);

    // // 使用 Fake 客户端（离线演示用，不访问真实服务）
    // let service: Arc<dyn DetectionServicePort> = Arc::new(FakeDetectionClient::new());

    match cli.command {
        Commands::Submit {
            paths,
            author,
            email,
            description,
        } => run_submit(service, paths, author, email, description).await,
        Commands::List {
            search,
            sort,
            order,
            page,
        } => run_list(service, config.query.page_size, search, sort, order, page).await,
        Commands::Show { id } => run_show(service, &base_url, id).await,
    }
}

async fn run_submit(
    service: Arc<dyn DetectionServicePort>,
    paths: Vec<PathBuf>,
    author: String,
    email: Option<String>,
    description: Option<String>,
) -> Result<()> {
    let mut submitter = BatchSubmitter::new(service);

    let mut files = Vec::new();
    for path in &paths {
        let payload = tokio::fs::read(path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string();
        files.push(FileItem::new(name, payload));
    }

    let accepted = submitter.add_files(files);
    if accepted < paths.len() {
        tracing::warn!(
            accepted = accepted,
            given = paths.len(),
            "Unsupported files were dropped"
        );
    }

    let mut template = MetadataTemplate::new(author);
    if let Some(email) = email {
        template = template.with_email(email);
    }
    if let Some(description) = description {
        template = template.with_description(description);
    }

    let outcome = submitter.submit(&template).await;

    for record in submitter.completed_results() {
        println!(
            "#{}  {}  persons={}  status={}",
            record.id,
            record.display_title(),
            record.number_of_persons,
            record.status
        );
    }

    match outcome {
        Ok(count) => {
            println!(
                "Submitted {} file(s), progress {:.0}%",
                count,
                submitter.progress_percent()
            );
            Ok(())
        }
        Err(err) => {
            let remaining = submitter.pending().len();
            Err(anyhow::anyhow!("{} ({} file(s) left in queue)", err, remaining))
        }
    }
}

async fn run_list(
    service: Arc<dyn DetectionServicePort>,
    page_size: u32,
    search: Option<String>,
    sort: String,
    order: String,
    page: u32,
) -> Result<()> {
    let sort_field: SortField = sort.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let sort_order: SortOrder = order.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let controller = QueryController::new(
        service,
        QueryOptions {
            page_size,
            search: search.unwrap_or_default(),
            sort_field,
            sort_order,
            page_index: page,
        },
    );

    controller.refresh().await;
    let snapshot = controller.snapshot().await;

    if let Some(err) = snapshot.error {
        return Err(anyhow::anyhow!("Query failed: {}", err));
    }

    println!(
        "Page {} of {} (sorted by {} {})",
        snapshot.page_index, snapshot.total_pages, snapshot.sort_field, snapshot.sort_order
    );
    if snapshot.items.is_empty() {
        println!("No detections found");
        return Ok(());
    }
    for record in &snapshot.items {
        println!(
            "#{:<6} {:<32} {:<16} persons={:<4} {:<10} {}",
            record.id,
            record.display_title(),
            record.author_name,
            record.number_of_persons,
            record.status,
            record.created_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

async fn run_show(service: Arc<dyn DetectionServicePort>, base_url: &str, id: i64) -> Result<()> {
    let record = service
        .fetch_detection(id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to fetch detection {}: {}", id, e))?;

    println!("id:          {}", record.id);
    println!("title:       {}", record.display_title());
    println!("author:      {}", record.author_name);
    if let Some(email) = &record.author_email {
        println!("email:       {}", email);
    }
    if let Some(description) = &record.description {
        println!("description: {}", description);
    }
    println!("persons:     {}", record.number_of_persons);
    println!("status:      {}", record.status);
    println!("created_at:  {}", record.created_at.to_rfc3339());
    if let Some(ms) = record.processing_time_ms {
        println!("processed:   {} ms", ms);
    }
    if let Some(path) = &record.visualized_image_path {
        println!("visualized:  {}/{}", base_url, path.trim_start_matches('/'));
    }
    Ok(())
}
