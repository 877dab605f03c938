//! The two upload legs, as traits.
//!
//! The orchestrator only talks to these traits, which keeps it testable
//! with mocks. The real HTTP clients implement them below.

use std::future::Future;
use std::pin::Pin;

use apkdrop_protocol::{Blob, ClientError, ProgressCallback, ProviderApp, StoredObject};

/// Boxed future returned by a leg.
pub type LegFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ClientError>> + Send + 'a>>;

/// Stages a blob in object storage and returns a public URL.
pub trait ObjectStorage: Send + Sync {
    /// Fails with `ClientError::Configuration` if a required setting is missing.
    fn ensure_configured(&self) -> Result<(), ClientError>;

    fn store<'a>(&'a self, blob: &'a Blob, on_progress: ProgressCallback)
    -> LegFuture<'a, StoredObject>;
}

/// Submits a package to the device testing provider.
pub trait DeviceTestingProvider: Send + Sync {
    /// Fails with `ClientError::Configuration` if a required setting is missing.
    fn ensure_configured(&self) -> Result<(), ClientError>;

    /// Uploads the package bytes directly.
    fn submit_blob<'a>(
        &'a self,
        blob: &'a Blob,
        on_progress: ProgressCallback,
    ) -> LegFuture<'a, ProviderApp>;

    /// Lets the provider fetch the package from an already published URL.
    fn submit_from_url<'a>(
        &'a self,
        url: &'a str,
        on_progress: ProgressCallback,
    ) -> LegFuture<'a, ProviderApp>;
}

impl ObjectStorage for apkdrop_object_storage::Client {
    fn ensure_configured(&self) -> Result<(), ClientError> {
        apkdrop_object_storage::Client::ensure_configured(self)
    }

    fn store<'a>(
        &'a self,
        blob: &'a Blob,
        on_progress: ProgressCallback,
    ) -> LegFuture<'a, StoredObject> {
        Box::pin(apkdrop_object_storage::Client::store(self, blob, on_progress))
    }
}

impl DeviceTestingProvider for apkdrop_device_testing::Client {
    fn ensure_configured(&self) -> Result<(), ClientError> {
        apkdrop_device_testing::Client::ensure_configured(self)
    }

    fn submit_blob<'a>(
        &'a self,
        blob: &'a Blob,
        on_progress: ProgressCallback,
    ) -> LegFuture<'a, ProviderApp> {
        Box::pin(apkdrop_device_testing::Client::submit_blob(
            self,
            blob,
            on_progress,
        ))
    }

    fn submit_from_url<'a>(
        &'a self,
        url: &'a str,
        on_progress: ProgressCallback,
    ) -> LegFuture<'a, ProviderApp> {
        Box::pin(apkdrop_device_testing::Client::submit_from_url(
            self,
            url,
            on_progress,
        ))
    }
}
