//! Fixed outbound texts.

use super::model::ExtractedData;

pub const GREETING: &str = "Hello! I'm your Car Insurance Assistant Bot. \
I'll help you get a car insurance policy in a few steps.\n\
Please send me a clear photo of your passport.";

pub const IDENTITY_DOCUMENT_RECEIVED: &str = "Passport photo received.\n\
Now send a photo of your vehicle identification document.";

/// Status line shown while the documents are being read.
pub const PROCESSING_DOCUMENTS: &str = "Vehicle document received.\n\
Processing your information...";

pub const SESSION_EXPIRED: &str = "Sorry, your session has expired and your document data \
is no longer available. Please send a photo of your passport to start again.";

pub const THANK_YOU: &str = "Thank you for choosing us! Your insurance policy has been issued. \
Send /start if you want to apply for another policy.";

pub const UPSTREAM_APOLOGY: &str = "Sorry, I couldn't process that right now. \
Please try again in a moment.";

/// Summary of the extracted record followed by the confirmation question.
pub fn extraction_summary(data: &ExtractedData) -> String {
    format!(
        "Here's what I found:\n\
         Name: {}\n\
         Passport ID: {}\n\
         Vehicle ID: {}\n\n\
         Is this information correct?",
        data.name, data.passport_number, data.vehicle_number
    )
}
