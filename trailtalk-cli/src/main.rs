use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::{Parser, Subcommand};
use trailtalk_client::{ClientError, Comment, NewPost, Post, PostUpdate, TrailTalkClient};

const SERVER_ENV: &str = "TRAILTALK_SERVER";
const DEFAULT_SERVER: &str = "http://127.0.0.1:5002";

#[derive(Debug, Parser)]
#[command(name = "trailtalk-cli", version, about = "CLI клиент для trailtalk-server")]
struct Cli {
    /// Адрес сервера. По умолчанию `TRAILTALK_SERVER` или http://127.0.0.1:5002.
    #[arg(long, global = true)]
    server: Option<String>,

    /// Вывести ответ сервера как JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Создание поста.
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        content: String,
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        secret_key: String,
        /// Тег из словаря сервера; можно повторять.
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long)]
        image_url: Option<String>,
        /// Локальный файл изображения (jpeg, jpg, png, gif).
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Список всех постов, новые первыми.
    List,
    /// Получение поста по id.
    Get {
        #[arg(long)]
        id: String,
    },
    /// Изменение поста (нужен secret key).
    ///
    /// Не указанные поля остаются прежними.
    Update {
        #[arg(long)]
        id: String,
        #[arg(long)]
        secret_key: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        user_id: Option<String>,
        /// Новый набор тегов; можно повторять.
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Удалить все теги поста.
        #[arg(long, conflicts_with = "tags")]
        clear_tags: bool,
        #[arg(long)]
        image_url: Option<String>,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Удаление поста (нужен secret key).
    Delete {
        #[arg(long)]
        id: String,
        #[arg(long)]
        secret_key: String,
    },
    /// Голос за пост.
    Upvote {
        #[arg(long)]
        id: String,
    },
    /// Комментарий к посту.
    Comment {
        #[arg(long)]
        id: String,
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        text: String,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Ошибка: {err}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let server = resolve_server(cli.server, std::env::var(SERVER_ENV).ok());
    let client = TrailTalkClient::new(server).map_err(map_client_error)?;
    let json = cli.json;

    match cli.command {
        Command::Create {
            title,
            content,
            user_id,
            secret_key,
            tags,
            image_url,
            image,
        } => {
            let post = client
                .create_post(&NewPost {
                    title,
                    content,
                    image_url,
                    tags,
                    user_id,
                    secret_key,
                    image,
                })
                .await
                .map_err(map_client_error)?;
            print_post("Пост создан", &post, json)?;
        }
        Command::List => {
            let posts = client.list_posts().await.map_err(map_client_error)?;
            print_list(&posts, json)?;
        }
        Command::Get { id } => {
            let post = client.get_post(&id).await.map_err(map_client_error)?;
            print_post("Пост", &post, json)?;
        }
        Command::Update {
            id,
            secret_key,
            title,
            content,
            user_id,
            tags,
            clear_tags,
            image_url,
            image,
        } => {
            let update = PostUpdate {
                id,
                secret_key,
                title,
                content,
                image_url,
                tags: tags_update(tags, clear_tags),
                user_id,
                image,
            };
            let post = client
                .update_post(&update)
                .await
                .map_err(map_client_error)?;
            print_post("Пост обновлён", &post, json)?;
        }
        Command::Delete { id, secret_key } => {
            let message = client
                .delete_post(&id, &secret_key)
                .await
                .map_err(map_client_error)?;
            println!("{message}: id={id}");
        }
        Command::Upvote { id } => {
            let post = client.upvote_post(&id).await.map_err(map_client_error)?;
            println!("Голос учтён: id={}, upvotes={}", post.id, post.upvotes);
        }
        Command::Comment { id, user_id, text } => {
            let comment = client
                .add_comment(&id, &user_id, &text)
                .await
                .map_err(map_client_error)?;
            print_comment(&comment, json)?;
        }
    }

    Ok(())
}

fn resolve_server(flag: Option<String>, env: Option<String>) -> String {
    let raw = flag
        .or(env)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_SERVER.to_string());
    normalize_server(raw)
}

fn normalize_server(server: String) -> String {
    if server.starts_with("http://") || server.starts_with("https://") {
        return server;
    }

    format!("http://{server}")
}

/// Пустой список без `--clear-tags` значит "теги не менять".
fn tags_update(tags: Vec<String>, clear: bool) -> Option<Vec<String>> {
    if clear {
        return Some(Vec::new());
    }
    if tags.is_empty() { None } else { Some(tags) }
}

fn map_client_error(err: ClientError) -> anyhow::Error {
    let message = match err {
        ClientError::Forbidden(_) => "неверный secret key".to_string(),
        ClientError::NotFound(_) => "пост не найден".to_string(),
        ClientError::InvalidRequest(message) => format!("некорректный запрос: {message}"),
        ClientError::Server(message) => format!("ошибка сервера: {message}"),
        ClientError::EmptyResponse => "сервер вернул пустой ответ".to_string(),
        ClientError::Io(err) => format!("ошибка чтения файла: {err}"),
        ClientError::Http(err) => format!("ошибка HTTP: {err}"),
    };
    anyhow::anyhow!(message)
}

fn print_post(title: &str, post: &Post, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(post)?);
        return Ok(());
    }

    println!("{title}");
    println!("id: {}", post.id);
    println!("title: {}", post.title);
    println!("content: {}", post.content);
    println!("user_id: {}", post.user_id);
    println!("tags: {}", post.tags.join(", "));
    println!("upvotes: {}", post.upvotes);
    if let Some(image_url) = &post.image_url {
        println!("image_url: {image_url}");
    }
    if let Some(path) = &post.local_image_path {
        println!("local_image_path: {path}");
    }
    println!("created_at: {}", post.created_at);
    println!("updated_at: {}", post.updated_at);
    println!("comments: {}", post.comments.len());
    for comment in &post.comments {
        println!("  - {}: {}", comment.user_id, comment.comment);
    }
    Ok(())
}

fn print_list(posts: &[Post], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(posts)?);
        return Ok(());
    }

    println!("Постов: {}", posts.len());
    for post in posts {
        println!(
            "- [{}] {} (user_id={}, upvotes={}, comments={})",
            post.id,
            post.title,
            post.user_id,
            post.upvotes,
            post.comments.len()
        );
    }
    Ok(())
}

fn print_comment(comment: &Comment, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(comment)?);
        return Ok(());
    }

    println!("Комментарий добавлен");
    println!("user_id: {}", comment.user_id);
    println!("comment: {}", comment.comment);
    println!("created_at: {}", comment.created_at);
    Ok(())
}
