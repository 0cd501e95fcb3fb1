//! Scripted fake upstreams for unit tests

use crate::convert::encode_png;
use crate::prompt::EnhancedPrompt;
use crate::provider::*;
use image::{DynamicImage, Rgb, RgbImage};
use sculpt_core::{Result, SculptError};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread::JoinHandle;
use std::time::Duration;

pub(crate) fn white_image(size: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(size, size, Rgb([255, 255, 255])))
}

/// A product shot on a dark grey backdrop
pub(crate) fn dark_image(size: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(size, size, Rgb([40, 40, 40])))
}

/// What the fake generator answers on a given call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reply {
    White,
    Dark,
    /// 2xx with bytes that are not an image
    Garbage,
    /// Transport failure or non-2xx
    Fail,
}

/// Plays back `script` one reply per call, repeating the last one
pub(crate) struct FakeGenerator {
    script: Vec<Reply>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<EnhancedPrompt>>,
}

impl FakeGenerator {
    pub(crate) fn new(script: &[Reply]) -> Self {
        Self {
            script: script.to_vec(),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_prompt(&self) -> Option<EnhancedPrompt> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

impl ImageGenerator for FakeGenerator {
    fn name(&self) -> &str {
        "fake"
    }

    fn health_check(&self) -> Result<ProviderStatus> {
        Ok(ProviderStatus::Available)
    }

    fn generate(&self, prompt: &EnhancedPrompt) -> Result<Vec<u8>> {
        let idx = self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.clone());
        let reply = self
            .script
            .get(idx)
            .or(self.script.last())
            .copied()
            .unwrap_or(Reply::Fail);
        match reply {
            Reply::White => encode_png(&white_image(64)),
            Reply::Dark => encode_png(&dark_image(64)),
            Reply::Garbage => Ok(b"<html>model loading</html>".to_vec()),
            Reply::Fail => Err(SculptError::UpstreamUnavailable(
                "fake returned HTTP 503".to_string(),
            )),
        }
    }
}

enum ConverterReply {
    Model(Vec<u8>),
    Failed(String),
    Unavailable(String),
}

/// Returns one fixed result for every call
pub(crate) struct FakeConverter {
    reply: ConverterReply,
    calls: AtomicUsize,
    last_image: Mutex<Option<Vec<u8>>>,
}

impl FakeConverter {
    fn with_reply(reply: ConverterReply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            last_image: Mutex::new(None),
        }
    }

    pub(crate) fn returning(model: Vec<u8>) -> Self {
        Self::with_reply(ConverterReply::Model(model))
    }

    pub(crate) fn failing(msg: &str) -> Self {
        Self::with_reply(ConverterReply::Failed(msg.to_string()))
    }

    pub(crate) fn unavailable(msg: &str) -> Self {
        Self::with_reply(ConverterReply::Unavailable(msg.to_string()))
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_image(&self) -> Option<Vec<u8>> {
        self.last_image.lock().unwrap().clone()
    }
}

impl MeshConverter for FakeConverter {
    fn name(&self) -> &str {
        "fake"
    }

    fn health_check(&self) -> Result<ProviderStatus> {
        Ok(ProviderStatus::Available)
    }

    fn convert(&self, image_png: &[u8], _params: &ConversionParams) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_image.lock().unwrap() = Some(image_png.to_vec());
        match &self.reply {
            ConverterReply::Model(bytes) => Ok(bytes.clone()),
            ConverterReply::Failed(msg) => Err(SculptError::ConversionFailed(msg.clone())),
            ConverterReply::Unavailable(msg) => Err(SculptError::UpstreamUnavailable(msg.clone())),
        }
    }
}

/// How the local HTTP stub answers one connection
pub(crate) enum Canned {
    /// Status line such as "503 Service Unavailable", then the body
    Respond(&'static str, Vec<u8>),
    /// Read the request and keep the socket open without answering
    Silent(Duration),
}

/// Serve `replies` on a loopback port, one per connection, in order.
///
/// Returns the URL for `path` and a handle yielding every request seen
/// (head plus body, lossy UTF-8) and the total connection count, including
/// connections made after the script ran out.
pub(crate) fn stub_server(
    path: &str,
    replies: Vec<Canned>,
) -> (String, JoinHandle<(Vec<String>, usize)>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}{}", listener.local_addr().unwrap(), path);

    let handle = std::thread::spawn(move || {
        let mut requests = Vec::new();
        for reply in replies {
            let (stream, _) = listener.accept().unwrap();
            let (request, mut stream) = read_request(stream);
            requests.push(request);
            match reply {
                Canned::Respond(status, body) => {
                    let head = format!(
                        "HTTP/1.1 {}\r\nContent-Type: application/octet-stream\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                        status,
                        body.len()
                    );
                    stream.write_all(head.as_bytes()).unwrap();
                    stream.write_all(&body).unwrap();
                    stream.flush().unwrap();
                }
                Canned::Silent(hold) => {
                    std::thread::spawn(move || {
                        std::thread::sleep(hold);
                        drop(stream);
                    });
                }
            }
        }

        // Any further attempt by the client shows up as another connection
        listener.set_nonblocking(true).unwrap();
        std::thread::sleep(Duration::from_millis(200));
        let mut connections = requests.len();
        while listener.accept().is_ok() {
            connections += 1;
        }
        (requests, connections)
    });

    (url, handle)
}

fn read_request(stream: TcpStream) -> (String, TcpStream) {
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    let mut reader = BufReader::new(stream);

    let mut head = String::new();
    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        if let Some(v) = line.to_ascii_lowercase().strip_prefix("content-length:") {
            content_length = v.trim().parse().unwrap_or(0);
        }
        head.push_str(&line);
        if line == "\r\n" {
            break;
        }
    }
    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).ok();
    head.push_str(&String::from_utf8_lossy(&body));
    (head, reader.into_inner())
}
