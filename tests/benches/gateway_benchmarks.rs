//! # Gateway Benchmarks
//!
//! Per-request costs on the webhook hot path:
//!
//! | Stage | Operation |
//! |-------|-----------|
//! | wx-01 | request signature check |
//! | wx-02 | message XML parse |
//! | wx-02 | envelope open (verify, decrypt, parse) |
//! | wx-02 | envelope seal (encrypt, sign) |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use shared_types::AccountConfig;
use wx_01_signature::{compute_signature, verify};
use wx_02_envelope::{parse_message, EnvelopeCodecApi, SecureEnvelopeCodec};

const KEY: &str = "abcdefghijklmnopqrstuvwxyz0123456789ABCDEFG";
const TS: &str = "1409304348";
const NONCE: &str = "xxxxxx";

fn message(content_len: usize) -> String {
    format!(
        "<xml><ToUserName><![CDATA[gh_account]]></ToUserName>\
         <FromUserName><![CDATA[user_openid]]></FromUserName>\
         <CreateTime>1348831860</CreateTime><MsgType><![CDATA[text]]></MsgType>\
         <Content><![CDATA[{}]]></Content><MsgId>1234567890123456</MsgId></xml>",
        "x".repeat(content_len)
    )
}

fn codec() -> SecureEnvelopeCodec {
    let account = AccountConfig::new("wx1", "secret", "token", true, Some(KEY.into()))
        .expect("valid account");
    SecureEnvelopeCodec::new(&account).expect("valid key")
}

fn bench_signature(c: &mut Criterion) {
    let signature = compute_signature("token", TS, NONCE);
    c.bench_function("wx-01/verify", |b| {
        b.iter(|| verify(black_box("token"), black_box(TS), black_box(NONCE), &signature))
    });
}

fn bench_parse(c: &mut Criterion) {
    let xml = message(64);
    c.bench_function("wx-02/parse_message", |b| {
        b.iter(|| parse_message(black_box(&xml)).expect("parses"))
    });
}

fn bench_envelope(c: &mut Criterion) {
    let codec = codec();
    let mut group = c.benchmark_group("wx-02/envelope");

    for size in [64usize, 1024, 16 * 1024] {
        let xml = message(size);
        let sealed = codec.seal(&xml, TS, NONCE).expect("seals");
        let envelope = parse_message(&sealed).expect("parses");
        let msg_signature = envelope.text("MsgSignature").expect("signed").to_string();

        group.throughput(Throughput::Bytes(xml.len() as u64));
        group.bench_with_input(BenchmarkId::new("seal", size), &xml, |b, xml| {
            b.iter(|| codec.seal(black_box(xml), TS, NONCE).expect("seals"))
        });
        group.bench_with_input(BenchmarkId::new("decrypt", size), &sealed, |b, sealed| {
            b.iter(|| {
                codec
                    .decrypt(Some(msg_signature.as_str()), TS, NONCE, black_box(sealed))
                    .expect("opens")
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_signature, bench_parse, bench_envelope);
criterion_main!(benches);
