pub mod google_news;
