use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use mercari_core::{ApiClient, ImageFile, ItemFeed};
use mercari_storefront::config::{Cli, Command};
use mercari_storefront::views::{
    self, Credentials, Home, ItemDetail, Listing, ListingDraft, Login, Search, Signup, SignupForm,
    UserProfile,
};
use mercari_storefront::{logging, CookieJar, Storefront, ToastLevel, UreqTransport};

type App = Storefront<UreqTransport, CookieJar>;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let cookies = CookieJar::open(&cli.cookies)
        .with_context(|| format!("failed to open cookie jar {}", cli.cookies.display()))?;
    tracing::debug!(server = %cli.server, "starting storefront");
    let mut app = Storefront::new(ApiClient::new(&cli.server, UreqTransport::new()), cookies);

    let screen = run(&mut app, cli.command)?;
    println!("{}", views::header(app.identity()));
    println!("{screen}");

    let mut failed = false;
    for toast in app.toasts_mut().drain() {
        failed |= toast.level == ToastLevel::Error;
        println!("{toast}");
    }
    Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

fn run(app: &mut App, command: Command) -> Result<String> {
    let screen = match command {
        Command::Signup { name, password } => {
            let form = SignupForm { name, password };
            Signup::new().submit(app, &form);
            home(app, ItemFeed::OnSale)
        }
        Command::Login {
            user,
            password,
            name,
        } => {
            let credentials = if name {
                Credentials::Name {
                    user_name: user,
                    password,
                }
            } else {
                let user_id = user
                    .parse()
                    .with_context(|| format!("user id must be a number, got {user:?}"))?;
                Credentials::Id { user_id, password }
            };
            let mut login = Login::new();
            login.submit(app, &credentials);
            login.render(app)
        }
        Command::Logout => {
            app.logout().context("failed to clear session cookies")?;
            views::sign_in_prompt()
        }
        Command::Home { feed } => {
            app.cookies_mut().set_active_tab("home")?;
            home(app, feed.into())
        }
        Command::Item { id, save_image } => {
            let mut detail = ItemDetail::new(id);
            detail.load(app);
            if let (Some(path), Some(blob)) = (save_image, detail.image()) {
                fs::write(&path, &blob.bytes)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                app.toasts_mut().info(format!("Image saved to {}", path.display()));
            }
            detail.render(app)
        }
        Command::Purchase { id } => {
            let mut detail = ItemDetail::new(id);
            detail.load(app);
            detail.purchase(app);
            detail.render(app)
        }
        Command::Sell {
            name,
            price,
            category,
            description,
            image,
            suggest,
        } => {
            app.cookies_mut().set_active_tab("sell")?;
            let mut listing = Listing::new(ListingDraft {
                name,
                category_id: category,
                price,
                description,
                image: Some(read_image(&image)?),
            });
            listing.load_categories(app);
            if suggest {
                listing.suggest_description(app);
            }
            listing.submit(app);
            listing.render(app)
        }
        Command::Categories => {
            let mut listing = Listing::default();
            listing.load_categories(app);
            listing
                .categories()
                .iter()
                .map(|c| format!("{}: {}", c.id, c.name))
                .collect::<Vec<_>>()
                .join("\n")
        }
        Command::Describe { name, description } => match app.api().describe(&name, &description) {
            Ok(text) => text,
            Err(err) => {
                app.report(&err);
                String::new()
            }
        },
        Command::Profile { user_id } => match user_id.or(app.user_id()) {
            Some(user_id) => {
                app.cookies_mut().set_active_tab("profile")?;
                let mut profile = UserProfile::new(user_id);
                profile.load(app);
                profile.render(app)
            }
            None => views::sign_in_prompt(),
        },
        Command::Balance { amount } => match app.user_id() {
            Some(user_id) => {
                let mut profile = UserProfile::new(user_id);
                profile.add_balance(app, amount);
                profile.render(app)
            }
            None => views::sign_in_prompt(),
        },
        Command::Search { keyword } => {
            let mut search = Search::new();
            match keyword {
                Some(keyword) => search.run(app, &keyword),
                None => search.resume(app),
            };
            search.render(app)
        }
    };
    Ok(screen)
}

fn home(app: &mut App, feed: ItemFeed) -> String {
    let mut home = Home::new(feed);
    if app.gate().check().is_open() {
        home.load(app);
    }
    home.render(app)
}

fn read_image(path: &Path) -> Result<ImageFile> {
    let bytes = fs::read(path).with_context(|| format!("failed to read image {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    Ok(ImageFile {
        file_name,
        content_type: image_content_type(path),
        bytes,
    })
}

fn image_content_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_type_ignores_extension_case() {
        assert_eq!(image_content_type(Path::new("desk.JPG")), "image/jpeg");
        assert_eq!(image_content_type(Path::new("desk.png")), "image/png");
        assert_eq!(image_content_type(Path::new("photo.webp")), "image/webp");
        assert_eq!(image_content_type(Path::new("notes")), "application/octet-stream");
    }

    #[test]
    fn read_image_keeps_file_name_and_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Desk.JPEG");
        fs::write(&path, b"jpeg bytes").unwrap();

        let image = read_image(&path).unwrap();
        assert_eq!(image.file_name, "Desk.JPEG");
        assert_eq!(image.content_type, "image/jpeg");
        assert_eq!(image.bytes, b"jpeg bytes");
    }
}
