//! scribe-core
//!
//! Core building blocks for the daily article publisher.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（record, state, quota, article, ids, errors）
//! - **ports**: 抽象化レイヤー（RecordStore, Generator, Clock, IdGenerator）
//! - **impls**: 実装（CSV / JSON store, Gemini client, テスト用 generator）
//! - **app**: アプリケーションロジック（builder, runner, prompt, status）
//! - **config**: 設定の層（default → file → env → flags）

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;
