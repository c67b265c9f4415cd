//! tower-lsp backend: document store, diagnostics, completion and definition.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ropey::Rope;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_lsp::jsonrpc::{Error, Result};
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService, Server};
use tracing::{debug, error, info};

use crate::completion::{Completion, CompletionEngine};
use crate::config::Settings;
use crate::diagnostics::diagnostics;
use crate::gotodef::goto_definition;
use crate::rdf::syntax::{OxSyntax, RdfSyntax};

/// An open document.
struct Document {
    text: Rope,
    language_id: String,
    version: i32,
}

impl Document {
    /// Lines without their terminators; a trailing newline gives a last empty line.
    fn lines(&self) -> Vec<String> {
        self.text
            .lines()
            .map(|line| line.to_string().trim_end_matches(['\n', '\r']).to_string())
            .collect()
    }
}

pub struct Backend {
    client: Client,
    settings: Settings,
    syntax: Arc<dyn RdfSyntax>,
    engine: Arc<Mutex<CompletionEngine>>,
    documents: Arc<RwLock<HashMap<Url, Document>>>,
}

/// Recovers the engine from a poisoned lock.
fn lock(engine: &Mutex<CompletionEngine>) -> MutexGuard<'_, CompletionEngine> {
    engine.lock().unwrap_or_else(PoisonError::into_inner)
}

fn to_completion_item(completion: Completion) -> CompletionItem {
    CompletionItem {
        label: completion.label,
        detail: completion.detail,
        documentation: completion.documentation.map(Documentation::String),
        ..Default::default()
    }
}

impl Backend {
    pub fn new(client: Client, settings: Settings, engine: Arc<Mutex<CompletionEngine>>) -> Self {
        Self {
            client,
            settings,
            syntax: Arc::new(OxSyntax),
            engine,
            documents: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Lines and language of an open document.
    async fn snapshot(&self, uri: &Url) -> Option<(Vec<String>, String)> {
        let documents = self.documents.read().await;
        let document = documents.get(uri)?;
        Some((document.lines(), document.language_id.clone()))
    }

    async fn publish_diagnostics(&self, uri: Url) {
        let (lines, language, version) = {
            let documents = self.documents.read().await;
            let Some(document) = documents.get(&uri) else {
                return;
            };
            (document.lines(), document.language_id.clone(), document.version)
        };

        let Some(diags) = diagnostics(
            self.syntax.as_ref(),
            &self.settings,
            &lines,
            Some(language.as_str()),
            &uri,
        ) else {
            return;
        };
        self.client
            .publish_diagnostics(uri, diags, Some(version))
            .await;
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, _params: InitializeParams) -> Result<InitializeResult> {
        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(
                    TextDocumentSyncOptions {
                        open_close: Some(true),
                        change: Some(TextDocumentSyncKind::FULL),
                        save: Some(TextDocumentSyncSaveOptions::Supported(true)),
                        ..Default::default()
                    },
                )),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(vec![":".into(), "=".into(), " ".into()]),
                    resolve_provider: Some(false),
                    ..Default::default()
                }),
                definition_provider: Some(OneOf::Left(true)),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "rdflangserver".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "rdflangserver initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let item = params.text_document;
        debug!("Opened {} ({})", item.uri, item.language_id);
        self.documents.write().await.insert(
            item.uri.clone(),
            Document {
                text: Rope::from_str(&item.text),
                language_id: item.language_id,
                version: item.version,
            },
        );
        self.publish_diagnostics(item.uri).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let Some(change) = params.content_changes.into_iter().last() else {
            return;
        };

        {
            let mut documents = self.documents.write().await;
            let Some(document) = documents.get_mut(&uri) else {
                return;
            };
            document.text = Rope::from_str(&change.text);
            document.version = params.text_document.version;
        }
        self.publish_diagnostics(uri).await;
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        self.publish_diagnostics(params.text_document.uri).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.documents.write().await.remove(&uri);
        self.client.publish_diagnostics(uri, vec![], None).await;
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;
        let Some((lines, language)) = self.snapshot(&uri).await else {
            return Ok(None);
        };

        let engine = self.engine.clone();
        let completions = tokio::task::spawn_blocking(move || {
            lock(&engine).get_completions(
                &lines,
                position.line as usize,
                position.character as usize,
                Some(language.as_str()),
            )
        })
        .await
        .map_err(|err| {
            error!("Completion task failed: {err}");
            Error::internal_error()
        })?;

        Ok(Some(CompletionResponse::List(CompletionList {
            is_incomplete: false,
            items: completions.into_iter().map(to_completion_item).collect(),
        })))
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        let Some((lines, _)) = self.snapshot(&uri).await else {
            return Ok(None);
        };

        let engine = self.engine.clone();
        let definition = tokio::task::spawn_blocking(move || {
            goto_definition(
                lock(&engine).cache_mut(),
                &lines,
                position.line as usize,
                position.character as usize,
            )
        })
        .await
        .map_err(|err| {
            error!("Definition task failed: {err}");
            Error::internal_error()
        })?;

        let location = definition.and_then(|definition| {
            let target = Position {
                line: definition.line as u32,
                character: definition.character as u32,
            };
            Some(Location {
                uri: Url::from_file_path(&definition.path).ok()?,
                range: Range {
                    start: target,
                    end: target,
                },
            })
        });

        Ok(location.map(GotoDefinitionResponse::Scalar))
    }
}

fn service(settings: Settings, engine: CompletionEngine) -> (LspService<Backend>, tower_lsp::ClientSocket) {
    let engine = Arc::new(Mutex::new(engine));
    LspService::new(move |client| Backend::new(client, settings, engine))
}

/// Serves one client over stdin/stdout.
pub async fn run_stdio(settings: Settings, engine: CompletionEngine) {
    let (service, socket) = service(settings, engine);
    Server::new(tokio::io::stdin(), tokio::io::stdout(), socket)
        .serve(service)
        .await;
}

/// Serves the first client that connects to `address`.
pub async fn run_tcp(
    address: SocketAddr,
    settings: Settings,
    engine: CompletionEngine,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(address).await?;
    info!("Listening on {address}");
    let (stream, peer) = listener.accept().await?;
    info!("Client connected from {peer}");

    let (read, write) = tokio::io::split(stream);
    let (service, socket) = service(settings, engine);
    Server::new(read, write, socket).serve(service).await;
    Ok(())
}
