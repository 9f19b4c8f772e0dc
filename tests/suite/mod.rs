mod headless;
mod session;
