use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use viral_agent::cli::Args;
use viral_agent::config::{Config, RECOMMENDED_MODELS};
use viral_agent::error::{ConfigError, WorkflowError};
use viral_agent::generator::outlet::{DiskOutlet, EventSink, NoopSink, Outlet, SseSink};
use viral_agent::generator::state::WorkflowStatus;
use viral_agent::generator::workflow::emit_error;
use viral_agent::llm::LLMClient;
use viral_agent::launch;

/// 配置错误
const EXIT_SETUP_ERROR: u8 = 2;
/// 工作流以 Failed 结束
const EXIT_WORKFLOW_FAILED: u8 = 3;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let config = args.into_config();

    // 日志写到 stderr，stdout 留给报告和事件流
    let verbose = args.verbose_logging(config.as_ref().ok());
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("⚠️ 警告: 无法初始化日志: {}", e);
    }

    match run(args, config).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ {:#}", e);
            if is_setup_error(&e) {
                ExitCode::from(EXIT_SETUP_ERROR)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn is_setup_error(error: &anyhow::Error) -> bool {
    error.downcast_ref::<ConfigError>().is_some()
        || matches!(
            error.downcast_ref::<WorkflowError>(),
            Some(WorkflowError::Configuration(_))
        )
}

async fn run(args: Args, config: Result<Config, ConfigError>) -> Result<ExitCode> {
    if args.list_models {
        list_models();
        return Ok(ExitCode::SUCCESS);
    }

    // 流式模式下，启动前的错误也以 error 事件写出
    let sink: Box<dyn EventSink> = if args.stream {
        Box::new(SseSink::new(std::io::stdout(), true))
    } else {
        Box::new(NoopSink)
    };

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            let error = WorkflowError::from(e);
            if args.stream {
                emit_error(sink.as_ref(), &error);
            }
            return Err(error.into());
        }
    };

    if args.check {
        check(config).await?;
        return Ok(ExitCode::SUCCESS);
    }

    let request = args.into_request_or_emit(&config, sink.as_ref())?;
    let report = launch(config, &request, sink.as_ref()).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if !args.stream {
        println!("{}", report.render_summary());
    }

    if let Some(path) = &args.output {
        DiskOutlet::new(path)
            .save(&report)
            .await
            .context("failed to save report")?;
    }

    if report.status == WorkflowStatus::Failed {
        return Ok(ExitCode::from(EXIT_WORKFLOW_FAILED));
    }
    Ok(ExitCode::SUCCESS)
}

fn list_models() {
    let default_model = Config::default().llm.model;
    println!("推荐模型:");
    for model in RECOMMENDED_MODELS {
        let marker = if *model == default_model { " (default)" } else { "" };
        println!("- {}{}", model, marker);
    }
}

async fn check(config: Config) -> Result<()> {
    config.validate()?;
    println!("✅ 配置有效 (provider: {}, model: {})", config.llm.provider, config.llm.model);

    let client = LLMClient::new(config.llm).context("failed to create LLM client")?;
    client
        .check_connection()
        .await
        .context("model connectivity check failed")?;
    println!("✅ 模型连接正常");
    Ok(())
}
