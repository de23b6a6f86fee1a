//! Generated protobuf code
//!
//! This module contains the Rust code for the monitoring protocol defined in
//! `proto/monitoring/v1/monitoring.proto`. With the `proto-gen` feature the
//! code is generated at build time by tonic-build; otherwise the committed
//! stubs below are used, so a protoc install is not required to build.

#[cfg(feature = "proto-gen")]
pub mod monitoring {
    pub mod v1 {
        tonic::include_proto!("monitoring.v1");
    }
}

// Committed stubs matching the tonic-build output for monitoring.proto
#[cfg(not(feature = "proto-gen"))]
pub mod monitoring {
    pub mod v1 {
        use prost::Message;

        #[derive(Clone, PartialEq, Message)]
        pub struct ContainerLogMetadata {
            #[prost(string, tag = "1")]
            pub container_id: String,
            #[prost(string, tag = "2")]
            pub container_name: String,
            #[prost(string, tag = "3")]
            pub image: String,
            #[prost(string, tag = "4")]
            pub state: String,
            #[prost(string, tag = "5")]
            pub log_path: String,
            #[prost(string, tag = "6")]
            pub log_driver: String,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct LogData {
            #[prost(message, optional, tag = "1")]
            pub metadata: Option<ContainerLogMetadata>,
            #[prost(string, tag = "2")]
            pub log: String,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct LogResponse {
            #[prost(string, tag = "1")]
            pub message: String,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct ContainerUsageStats {
            #[prost(string, tag = "1")]
            pub container_id: String,
            #[prost(int64, tag = "2")]
            pub timestamp: i64,
            #[prost(double, tag = "3")]
            pub cpu_percent: f64,
            #[prost(uint64, tag = "4")]
            pub cpu_usage: u64,
            #[prost(uint64, tag = "5")]
            pub system_cpu_usage: u64,
            #[prost(uint64, tag = "6")]
            pub memory_usage: u64,
            #[prost(uint64, tag = "7")]
            pub memory_limit: u64,
            #[prost(double, tag = "8")]
            pub memory_percent: f64,
            #[prost(uint64, tag = "9")]
            pub memory_cache: u64,
        }

        #[derive(Clone, PartialEq, Message)]
        pub struct UsageResponse {
            #[prost(string, tag = "1")]
            pub message: String,
        }

        /// Generated client implementations.
        pub mod log_streaming_service_client {
            #![allow(unused_variables, dead_code, missing_docs, clippy::let_unit_value)]
            use super::*;
            use tonic::codegen::*;
            use tonic::transport::Uri;

            #[derive(Debug, Clone)]
            pub struct LogStreamingServiceClient<T> {
                inner: tonic::client::Grpc<T>,
            }

            impl LogStreamingServiceClient<tonic::transport::Channel> {
                pub fn new(channel: tonic::transport::Channel) -> Self {
                    let inner = tonic::client::Grpc::new(channel);
                    Self { inner }
                }
            }

            impl<T> LogStreamingServiceClient<T>
            where
                T: tonic::client::GrpcService<tonic::body::BoxBody>,
                T::Error: Into<StdError>,
                T::ResponseBody: Body<Data = Bytes> + Send + 'static,
                <T::ResponseBody as Body>::Error: Into<StdError> + Send,
            {
                pub fn with_origin(inner: T, origin: Uri) -> Self {
                    let inner = tonic::client::Grpc::with_origin(inner, origin);
                    Self { inner }
                }

                pub fn with_interceptor<F>(
                    inner: T,
                    interceptor: F,
                ) -> LogStreamingServiceClient<InterceptedService<T, F>>
                where
                    F: tonic::service::Interceptor,
                    T::ResponseBody: Default,
                    T: tonic::codegen::Service<
                        http::Request<tonic::body::BoxBody>,
                        Response = http::Response<
                            <T as tonic::client::GrpcService<tonic::body::BoxBody>>::ResponseBody,
                        >,
                    >,
                    <T as tonic::codegen::Service<http::Request<tonic::body::BoxBody>>>::Error:
                        Into<StdError> + Send + Sync,
                {
                    let inner = InterceptedService::new(inner, interceptor);
                    let inner = tonic::client::Grpc::new(inner);
                    LogStreamingServiceClient { inner }
                }

                pub async fn stream_logs(
                    &mut self,
                    request: impl tonic::IntoStreamingRequest<Message = LogData>,
                ) -> std::result::Result<
                    tonic::Response<tonic::codec::Streaming<LogResponse>>,
                    tonic::Status,
                > {
                    self.inner.ready().await.map_err(|e| {
                        tonic::Status::new(
                            tonic::Code::Unknown,
                            format!("Service was not ready: {}", e.into()),
                        )
                    })?;
                    let codec = tonic::codec::ProstCodec::default();
                    let path = http::uri::PathAndQuery::from_static(
                        "/monitoring.v1.LogStreamingService/StreamLogs",
                    );
                    self.inner
                        .streaming(request.into_streaming_request(), path, codec)
                        .await
                }
            }
        }

        /// Generated client implementations.
        pub mod usage_streaming_service_client {
            #![allow(unused_variables, dead_code, missing_docs, clippy::let_unit_value)]
            use super::*;
            use tonic::codegen::*;
            use tonic::transport::Uri;

            #[derive(Debug, Clone)]
            pub struct UsageStreamingServiceClient<T> {
                inner: tonic::client::Grpc<T>,
            }

            impl UsageStreamingServiceClient<tonic::transport::Channel> {
                pub fn new(channel: tonic::transport::Channel) -> Self {
                    let inner = tonic::client::Grpc::new(channel);
                    Self { inner }
                }
            }

            impl<T> UsageStreamingServiceClient<T>
            where
                T: tonic::client::GrpcService<tonic::body::BoxBody>,
                T::Error: Into<StdError>,
                T::ResponseBody: Body<Data = Bytes> + Send + 'static,
                <T::ResponseBody as Body>::Error: Into<StdError> + Send,
            {
                pub fn with_origin(inner: T, origin: Uri) -> Self {
                    let inner = tonic::client::Grpc::with_origin(inner, origin);
                    Self { inner }
                }

                pub fn with_interceptor<F>(
                    inner: T,
                    interceptor: F,
                ) -> UsageStreamingServiceClient<InterceptedService<T, F>>
                where
                    F: tonic::service::Interceptor,
                    T::ResponseBody: Default,
                    T: tonic::codegen::Service<
                        http::Request<tonic::body::BoxBody>,
                        Response = http::Response<
                            <T as tonic::client::GrpcService<tonic::body::BoxBody>>::ResponseBody,
                        >,
                    >,
                    <T as tonic::codegen::Service<http::Request<tonic::body::BoxBody>>>::Error:
                        Into<StdError> + Send + Sync,
                {
                    let inner = InterceptedService::new(inner, interceptor);
                    let inner = tonic::client::Grpc::new(inner);
                    UsageStreamingServiceClient { inner }
                }

                pub async fn stream_usage(
                    &mut self,
                    request: impl tonic::IntoStreamingRequest<Message = ContainerUsageStats>,
                ) -> std::result::Result<
                    tonic::Response<tonic::codec::Streaming<UsageResponse>>,
                    tonic::Status,
                > {
                    self.inner.ready().await.map_err(|e| {
                        tonic::Status::new(
                            tonic::Code::Unknown,
                            format!("Service was not ready: {}", e.into()),
                        )
                    })?;
                    let codec = tonic::codec::ProstCodec::default();
                    let path = http::uri::PathAndQuery::from_static(
                        "/monitoring.v1.UsageStreamingService/StreamUsage",
                    );
                    self.inner
                        .streaming(request.into_streaming_request(), path, codec)
                        .await
                }
            }
        }

        /// Generated server implementations.
        pub mod log_streaming_service_server {
            #![allow(unused_variables, dead_code, missing_docs, clippy::let_unit_value)]
            use super::*;
            use tonic::codegen::*;

            /// Generated trait containing gRPC methods that should be implemented
            /// for use with LogStreamingServiceServer.
            #[async_trait]
            pub trait LogStreamingService: Send + Sync + 'static {
                /// Server streaming response type for the StreamLogs method.
                type StreamLogsStream: tonic::codegen::tokio_stream::Stream<
                        Item = std::result::Result<super::LogResponse, tonic::Status>,
                    > + Send
                    + 'static;

                async fn stream_logs(
                    &self,
                    request: tonic::Request<tonic::Streaming<super::LogData>>,
                ) -> std::result::Result<tonic::Response<Self::StreamLogsStream>, tonic::Status>;
            }

            #[derive(Debug)]
            pub struct LogStreamingServiceServer<T: LogStreamingService> {
                inner: _Inner<T>,
                accept_compression_encodings: EnabledCompressionEncodings,
                send_compression_encodings: EnabledCompressionEncodings,
                max_decoding_message_size: Option<usize>,
                max_encoding_message_size: Option<usize>,
            }

            struct _Inner<T>(Arc<T>);

            impl<T: LogStreamingService> LogStreamingServiceServer<T> {
                pub fn new(inner: T) -> Self {
                    Self::from_arc(Arc::new(inner))
                }

                pub fn from_arc(inner: Arc<T>) -> Self {
                    let inner = _Inner(inner);
                    Self {
                        inner,
                        accept_compression_encodings: Default::default(),
                        send_compression_encodings: Default::default(),
                        max_decoding_message_size: None,
                        max_encoding_message_size: None,
                    }
                }

                pub fn with_interceptor<F>(inner: T, interceptor: F) -> InterceptedService<Self, F>
                where
                    F: tonic::service::Interceptor,
                {
                    InterceptedService::new(Self::new(inner), interceptor)
                }

                /// Enable decompressing requests with the given encoding.
                #[must_use]
                pub fn accept_compressed(mut self, encoding: CompressionEncoding) -> Self {
                    self.accept_compression_encodings.enable(encoding);
                    self
                }

                /// Compress responses with the given encoding, if the client supports it.
                #[must_use]
                pub fn send_compressed(mut self, encoding: CompressionEncoding) -> Self {
                    self.send_compression_encodings.enable(encoding);
                    self
                }

                /// Limits the maximum size of a decoded message.
                #[must_use]
                pub fn max_decoding_message_size(mut self, limit: usize) -> Self {
                    self.max_decoding_message_size = Some(limit);
                    self
                }

                /// Limits the maximum size of an encoded message.
                #[must_use]
                pub fn max_encoding_message_size(mut self, limit: usize) -> Self {
                    self.max_encoding_message_size = Some(limit);
                    self
                }
            }

            impl<T, B> tonic::codegen::Service<http::Request<B>> for LogStreamingServiceServer<T>
            where
                T: LogStreamingService,
                B: Body + Send + 'static,
                B::Error: Into<StdError> + Send + 'static,
            {
                type Response = http::Response<tonic::body::BoxBody>;
                type Error = std::convert::Infallible;
                type Future = BoxFuture<Self::Response, Self::Error>;

                fn poll_ready(
                    &mut self,
                    _cx: &mut Context<'_>,
                ) -> Poll<std::result::Result<(), Self::Error>> {
                    Poll::Ready(Ok(()))
                }

                fn call(&mut self, req: http::Request<B>) -> Self::Future {
                    let inner = self.inner.clone();
                    match req.uri().path() {
                        "/monitoring.v1.LogStreamingService/StreamLogs" => {
                            #[allow(non_camel_case_types)]
                            struct StreamLogsSvc<T: LogStreamingService>(pub Arc<T>);
                            impl<T: LogStreamingService>
                                tonic::server::StreamingService<super::LogData>
                                for StreamLogsSvc<T>
                            {
                                type Response = super::LogResponse;
                                type ResponseStream = T::StreamLogsStream;
                                type Future =
                                    BoxFuture<tonic::Response<Self::ResponseStream>, tonic::Status>;

                                fn call(
                                    &mut self,
                                    request: tonic::Request<tonic::Streaming<super::LogData>>,
                                ) -> Self::Future {
                                    let inner = Arc::clone(&self.0);
                                    let fut = async move {
                                        <T as LogStreamingService>::stream_logs(&inner, request)
                                            .await
                                    };
                                    Box::pin(fut)
                                }
                            }
                            let accept_compression_encodings = self.accept_compression_encodings;
                            let send_compression_encodings = self.send_compression_encodings;
                            let max_decoding_message_size = self.max_decoding_message_size;
                            let max_encoding_message_size = self.max_encoding_message_size;
                            let inner = self.inner.clone();
                            let fut = async move {
                                let inner = inner.0;
                                let method = StreamLogsSvc(inner);
                                let codec = tonic::codec::ProstCodec::default();
                                let mut grpc = tonic::server::Grpc::new(codec)
                                    .apply_compression_config(
                                        accept_compression_encodings,
                                        send_compression_encodings,
                                    )
                                    .apply_max_message_size_config(
                                        max_decoding_message_size,
                                        max_encoding_message_size,
                                    );
                                let res = grpc.streaming(method, req).await;
                                Ok(res)
                            };
                            Box::pin(fut)
                        }
                        _ => Box::pin(async move {
                            Ok(http::Response::builder()
                                .status(200)
                                .header("grpc-status", "12")
                                .header("content-type", "application/grpc")
                                .body(empty_body())
                                .unwrap())
                        }),
                    }
                }
            }

            impl<T: LogStreamingService> Clone for LogStreamingServiceServer<T> {
                fn clone(&self) -> Self {
                    let inner = self.inner.clone();
                    Self {
                        inner,
                        accept_compression_encodings: self.accept_compression_encodings,
                        send_compression_encodings: self.send_compression_encodings,
                        max_decoding_message_size: self.max_decoding_message_size,
                        max_encoding_message_size: self.max_encoding_message_size,
                    }
                }
            }

            impl<T> Clone for _Inner<T> {
                fn clone(&self) -> Self {
                    Self(Arc::clone(&self.0))
                }
            }

            impl<T: std::fmt::Debug> std::fmt::Debug for _Inner<T> {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, "{:?}", self.0)
                }
            }

            impl<T: LogStreamingService> tonic::server::NamedService
                for LogStreamingServiceServer<T>
            {
                const NAME: &'static str = "monitoring.v1.LogStreamingService";
            }
        }

        /// Generated server implementations.
        pub mod usage_streaming_service_server {
            #![allow(unused_variables, dead_code, missing_docs, clippy::let_unit_value)]
            use super::*;
            use tonic::codegen::*;

            /// Generated trait containing gRPC methods that should be implemented
            /// for use with UsageStreamingServiceServer.
            #[async_trait]
            pub trait UsageStreamingService: Send + Sync + 'static {
                /// Server streaming response type for the StreamUsage method.
                type StreamUsageStream: tonic::codegen::tokio_stream::Stream<
                        Item = std::result::Result<super::UsageResponse, tonic::Status>,
                    > + Send
                    + 'static;

                async fn stream_usage(
                    &self,
                    request: tonic::Request<tonic::Streaming<super::ContainerUsageStats>>,
                ) -> std::result::Result<tonic::Response<Self::StreamUsageStream>, tonic::Status>;
            }

            #[derive(Debug)]
            pub struct UsageStreamingServiceServer<T: UsageStreamingService> {
                inner: _Inner<T>,
                accept_compression_encodings: EnabledCompressionEncodings,
                send_compression_encodings: EnabledCompressionEncodings,
                max_decoding_message_size: Option<usize>,
                max_encoding_message_size: Option<usize>,
            }

            struct _Inner<T>(Arc<T>);

            impl<T: UsageStreamingService> UsageStreamingServiceServer<T> {
                pub fn new(inner: T) -> Self {
                    Self::from_arc(Arc::new(inner))
                }

                pub fn from_arc(inner: Arc<T>) -> Self {
                    let inner = _Inner(inner);
                    Self {
                        inner,
                        accept_compression_encodings: Default::default(),
                        send_compression_encodings: Default::default(),
                        max_decoding_message_size: None,
                        max_encoding_message_size: None,
                    }
                }

                pub fn with_interceptor<F>(inner: T, interceptor: F) -> InterceptedService<Self, F>
                where
                    F: tonic::service::Interceptor,
                {
                    InterceptedService::new(Self::new(inner), interceptor)
                }

                /// Enable decompressing requests with the given encoding.
                #[must_use]
                pub fn accept_compressed(mut self, encoding: CompressionEncoding) -> Self {
                    self.accept_compression_encodings.enable(encoding);
                    self
                }

                /// Compress responses with the given encoding, if the client supports it.
                #[must_use]
                pub fn send_compressed(mut self, encoding: CompressionEncoding) -> Self {
                    self.send_compression_encodings.enable(encoding);
                    self
                }

                /// Limits the maximum size of a decoded message.
                #[must_use]
                pub fn max_decoding_message_size(mut self, limit: usize) -> Self {
                    self.max_decoding_message_size = Some(limit);
                    self
                }

                /// Limits the maximum size of an encoded message.
                #[must_use]
                pub fn max_encoding_message_size(mut self, limit: usize) -> Self {
                    self.max_encoding_message_size = Some(limit);
                    self
                }
            }

            impl<T, B> tonic::codegen::Service<http::Request<B>> for UsageStreamingServiceServer<T>
            where
                T: UsageStreamingService,
                B: Body + Send + 'static,
                B::Error: Into<StdError> + Send + 'static,
            {
                type Response = http::Response<tonic::body::BoxBody>;
                type Error = std::convert::Infallible;
                type Future = BoxFuture<Self::Response, Self::Error>;

                fn poll_ready(
                    &mut self,
                    _cx: &mut Context<'_>,
                ) -> Poll<std::result::Result<(), Self::Error>> {
                    Poll::Ready(Ok(()))
                }

                fn call(&mut self, req: http::Request<B>) -> Self::Future {
                    let inner = self.inner.clone();
                    match req.uri().path() {
                        "/monitoring.v1.UsageStreamingService/StreamUsage" => {
                            #[allow(non_camel_case_types)]
                            struct StreamUsageSvc<T: UsageStreamingService>(pub Arc<T>);
                            impl<T: UsageStreamingService>
                                tonic::server::StreamingService<super::ContainerUsageStats>
                                for StreamUsageSvc<T>
                            {
                                type Response = super::UsageResponse;
                                type ResponseStream = T::StreamUsageStream;
                                type Future =
                                    BoxFuture<tonic::Response<Self::ResponseStream>, tonic::Status>;

                                fn call(
                                    &mut self,
                                    request: tonic::Request<
                                        tonic::Streaming<super::ContainerUsageStats>,
                                    >,
                                ) -> Self::Future {
                                    let inner = Arc::clone(&self.0);
                                    let fut = async move {
                                        <T as UsageStreamingService>::stream_usage(&inner, request)
                                            .await
                                    };
                                    Box::pin(fut)
                                }
                            }
                            let accept_compression_encodings = self.accept_compression_encodings;
                            let send_compression_encodings = self.send_compression_encodings;
                            let max_decoding_message_size = self.max_decoding_message_size;
                            let max_encoding_message_size = self.max_encoding_message_size;
                            let inner = self.inner.clone();
                            let fut = async move {
                                let inner = inner.0;
                                let method = StreamUsageSvc(inner);
                                let codec = tonic::codec::ProstCodec::default();
                                let mut grpc = tonic::server::Grpc::new(codec)
                                    .apply_compression_config(
                                        accept_compression_encodings,
                                        send_compression_encodings,
                                    )
                                    .apply_max_message_size_config(
                                        max_decoding_message_size,
                                        max_encoding_message_size,
                                    );
                                let res = grpc.streaming(method, req).await;
                                Ok(res)
                            };
                            Box::pin(fut)
                        }
                        _ => Box::pin(async move {
                            Ok(http::Response::builder()
                                .status(200)
                                .header("grpc-status", "12")
                                .header("content-type", "application/grpc")
                                .body(empty_body())
                                .unwrap())
                        }),
                    }
                }
            }

            impl<T: UsageStreamingService> Clone for UsageStreamingServiceServer<T> {
                fn clone(&self) -> Self {
                    let inner = self.inner.clone();
                    Self {
                        inner,
                        accept_compression_encodings: self.accept_compression_encodings,
                        send_compression_encodings: self.send_compression_encodings,
                        max_decoding_message_size: self.max_decoding_message_size,
                        max_encoding_message_size: self.max_encoding_message_size,
                    }
                }
            }

            impl<T> Clone for _Inner<T> {
                fn clone(&self) -> Self {
                    Self(Arc::clone(&self.0))
                }
            }

            impl<T: std::fmt::Debug> std::fmt::Debug for _Inner<T> {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, "{:?}", self.0)
                }
            }

            impl<T: UsageStreamingService> tonic::server::NamedService
                for UsageStreamingServiceServer<T>
            {
                const NAME: &'static str = "monitoring.v1.UsageStreamingService";
            }
        }
    }
}

pub use monitoring::v1::log_streaming_service_client::LogStreamingServiceClient;
pub use monitoring::v1::log_streaming_service_server::{
    LogStreamingService, LogStreamingServiceServer,
};
pub use monitoring::v1::usage_streaming_service_client::UsageStreamingServiceClient;
pub use monitoring::v1::usage_streaming_service_server::{
    UsageStreamingService, UsageStreamingServiceServer,
};
pub use monitoring::v1::*;
