mod text_search;
mod timeline;
