use anyhow::Result;
use prakter_core::paths;
use std::path::Path;

pub fn run(root: &Path, port: u16, no_open: bool) -> Result<()> {
    paths::require_workspace(root)?;

    let rt = tokio::runtime::Runtime::new()?;
    let root_buf = root.to_path_buf();

    rt.block_on(async move {
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
        let actual_port = listener.local_addr()?.port();
        println!(
            "prakter UI for {} → http://localhost:{actual_port}",
            root_buf.display()
        );

        tokio::select! {
            res = prakter_server::serve_on(root_buf, listener, !no_open) => res,
            _ = tokio::signal::ctrl_c() => Ok(()),
        }
    })
}
