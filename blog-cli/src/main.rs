use blog_client::{BlogClient, Post, Tag};
use clap::{Parser, Subcommand};
use uuid::Uuid;

const TOKEN_FILE: &str = ".blog_token";

#[derive(Parser, Debug)]
struct Cli {
    #[clap(short, long)]
    server: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Register {
        #[clap(long)]
        username: String,
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
    },
    Login {
        #[clap(long)]
        username: String,
        #[clap(long)]
        password: String,
    },
    /// Newest posts first.
    ListPosts,
    Tagged {
        slug: String,
    },
    Search {
        query: String,
    },
    ShowPost {
        id: Uuid,
    },
    CreatePost {
        #[clap(long)]
        title: String,
        #[clap(long)]
        content: String,
        /// Comma or space separated.
        #[clap(long, default_value = "")]
        tags: String,
    },
    UpdatePost {
        id: Uuid,
        #[clap(long)]
        title: String,
        #[clap(long)]
        content: String,
        #[clap(long, default_value = "")]
        tags: String,
    },
    DeletePost {
        id: Uuid,
    },
    Comment {
        post_id: Uuid,
        #[clap(long)]
        content: String,
    },
    DeleteComment {
        id: Uuid,
    },
}

fn print_posts(posts: &[Post]) {
    println!("Posts ({})", posts.len());
    for post in posts {
        println!("- {}", post);
    }
}

fn print_tags(tags: &[Tag]) {
    let names: Vec<&str> = tags.iter().map(|t| t.slug.as_str()).collect();
    println!("Tags: {}", names.join(", "));
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    let endpoint = args.server.as_deref().unwrap_or("http://127.0.0.1:8080");
    let mut client = BlogClient::connect(endpoint)?.with_token_file(TOKEN_FILE);

    match args.command {
        Command::Register {
            username,
            email,
            password,
        } => {
            client.register(username, email, password).await?;
            println!("Successfully registered!");
        }
        Command::Login { username, password } => {
            client.login(username, password).await?;
            println!("Successfully logged in!");
        }
        Command::ListPosts => {
            let listing = client.list_posts().await?;
            print_posts(&listing.posts);
            print_tags(&listing.tags);
        }
        Command::Tagged { slug } => {
            let listing = client.tagged_posts(&slug).await?;
            println!("Tagged {}", listing.tag);
            print_posts(&listing.posts);
        }
        Command::Search { query } => {
            let listing = client.search(&query).await?;
            print_posts(&listing.posts);
        }
        Command::ShowPost { id } => {
            let detail = client.get_post(id).await?;
            println!("{}", detail.post);
            println!("Published {}", detail.post.published_date);
            println!("Tags: {}", detail.post.tags.join(", "));
            println!();
            println!("{}", detail.post.content);
            println!();
            for comment in detail.comments {
                println!("{}", comment);
            }
        }
        Command::CreatePost {
            title,
            content,
            tags,
        } => {
            let id = client.create_post(&title, &content, &tags).await?;
            println!("Post created! ID: {}", id);
        }
        Command::UpdatePost {
            id,
            title,
            content,
            tags,
        } => {
            client.update_post(id, &title, &content, &tags).await?;
            println!("Post updated: {}", id)
        }
        Command::DeletePost { id } => {
            client.delete_post(id).await?;
            println!("Post deleted!")
        }
        Command::Comment { post_id, content } => {
            client.add_comment(post_id, &content).await?;
            println!("Comment added to {}", post_id);
        }
        Command::DeleteComment { id } => {
            let post_id = client.delete_comment(id).await?;
            println!("Comment deleted from {}", post_id);
        }
    }

    Ok(())
}
