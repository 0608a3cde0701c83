use std::env;
use std::sync::Arc;

use chrono::NaiveDate;
use daily_fortune::affiliate::CoupangClient;
use daily_fortune::config::AppConfig;
use daily_fortune::fallback::FallbackFortuneGenerator;
use daily_fortune::fortune::{FortuneRequest, FortuneService};
use dotenv::dotenv;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: fortune_tester --name <NAME> --birth <YYYY-MM-DD> [--gender <GENDER>] [--config <PATH>] [--offline]");
        std::process::exit(1);
    }

    let name = parse_flag_value(&args, "--name").unwrap_or_else(|| {
        eprintln!("--name <NAME> is required");
        std::process::exit(1);
    });
    let birth = parse_flag_value(&args, "--birth").unwrap_or_else(|| {
        eprintln!("--birth <YYYY-MM-DD> is required");
        std::process::exit(1);
    });
    let birth_date = NaiveDate::parse_from_str(&birth, "%Y-%m-%d").unwrap_or_else(|e| {
        eprintln!("invalid --birth {}: {}", birth, e);
        std::process::exit(1);
    });
    let gender = parse_flag_value(&args, "--gender").unwrap_or_else(|| "미지정".to_string());
    let config_path = parse_flag_value(&args, "--config")
        .or_else(|| env::var("FORTUNE_CONFIG").ok())
        .unwrap_or_else(|| "config.yml".to_string());

    let config = AppConfig::load_or_default(&config_path).unwrap_or_else(|e| {
        eprintln!("config error: {}", e);
        std::process::exit(1);
    });

    // --offline: LLMを呼ばずにフォールバックだけで占う
    let service = if args.iter().any(|a| a == "--offline") {
        let search = Arc::new(CoupangClient::from_env(config.affiliate_timeout()));
        let fallback = Arc::new(FallbackFortuneGenerator::new(
            search,
            config.affiliate.product_type.clone(),
            config.affiliate.product_limit,
        ));
        FortuneService::new(None, fallback, config.llm_timeout())
    } else {
        FortuneService::from_config(&config)
    };

    let request = FortuneRequest {
        name: name.trim().to_string(),
        birth_date,
        gender,
    };
    let result = service.tell(&request).await;

    match serde_json::to_string_pretty(&result) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("serialize error: {}", e);
            std::process::exit(1);
        }
    }
}

fn parse_flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag).and_then(|i| args.get(i + 1)).cloned()
}
