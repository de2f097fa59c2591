pub mod document;
pub mod invoice;
pub mod material;
pub mod project;
pub mod task;
pub mod user;
pub mod vendor;

pub use document::{Document, DocumentUpload, DocumentVersion};
pub use invoice::{Invoice, InvoiceInput, InvoiceStatus};
pub use material::{Material, MaterialInput, MaterialStatus, MaterialStatusUpdate};
pub use project::{CreateProjectData, Project, ProjectStatus, UpdateProjectData};
pub use task::{DependencyRequest, Task, TaskInput, TaskPriority, TaskStatus};
pub use user::{
    AuthResponse, ForgotPasswordData, LoginCredentials, RegisterData, ResetPasswordData, Role,
    UpdateProfileData, User, UserSummary, VerifyOtpData,
};
pub use vendor::{Vendor, VendorInput, VendorRef};
